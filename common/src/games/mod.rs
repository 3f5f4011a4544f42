pub mod chain_reaction;
