pub mod frequency_mask_enhancer;
pub mod spectral_subtraction_enhancer;
