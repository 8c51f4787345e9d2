pub mod feature_vector;
