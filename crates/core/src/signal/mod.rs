pub mod band_pass;
pub mod spectral_subtraction;
pub mod stft;
pub mod wiener;
