pub mod energy_dominance_policy;
pub mod similarity_scorer;
pub mod spectral_balance_policy;
