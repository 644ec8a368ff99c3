//! Centred zero-padding and cropping of 3-D volumes.
//!
//! Both operations keep the image origin (index `floor(n / 2)`) aligned:
//! a volume of size `n` sits at offset `floor(m / 2) - floor(n / 2)` inside
//! a volume of size `m`.

use ndarray::{s, Array3};
use num_complex::Complex32;

use crate::error::{NufftError, Result};

fn centred_offsets(inner: [usize; 3], outer: [usize; 3]) -> Result<[usize; 3]> {
    if (0..3).any(|a| inner[a] > outer[a]) {
        return Err(NufftError::invalid_configuration(format!(
            "cannot fit volume {:?} inside {:?}",
            inner, outer
        )));
    }
    Ok([
        outer[0] / 2 - inner[0] / 2,
        outer[1] / 2 - inner[1] / 2,
        outer[2] / 2 - inner[2] / 2,
    ])
}

fn dims(volume: &Array3<Complex32>) -> [usize; 3] {
    let (a, b, c) = volume.dim();
    [a, b, c]
}

/// Zero-pad `volume` to `target`, centred on the image origin.
pub fn zero_pad(volume: &Array3<Complex32>, target: [usize; 3]) -> Result<Array3<Complex32>> {
    let shape = dims(volume);
    let off = centred_offsets(shape, target)?;
    let mut out = Array3::from_elem((target[0], target[1], target[2]), Complex32::new(0.0, 0.0));
    out.slice_mut(s![
        off[0]..off[0] + shape[0],
        off[1]..off[1] + shape[1],
        off[2]..off[2] + shape[2]
    ])
    .assign(volume);
    Ok(out)
}

/// Crop the centre of `volume` down to `target`; inverse of [`zero_pad`].
pub fn crop(volume: &Array3<Complex32>, target: [usize; 3]) -> Result<Array3<Complex32>> {
    let shape = dims(volume);
    let off = centred_offsets(target, shape)?;
    Ok(volume
        .slice(s![
            off[0]..off[0] + target[0],
            off[1]..off[1] + target[1],
            off[2]..off[2] + target[2]
        ])
        .to_owned())
}
