use crate::fitness::Candidate;
use crate::raster::Raster;

/// Paints `candidate` onto `canvas` over exactly the pixels it was scored on.
pub fn commit(canvas: &mut Raster, candidate: &Candidate) {
    let (w, h) = canvas.dimensions();
    candidate
        .shape
        .for_each_covered(w, h, |x, y| canvas.set(x, y, candidate.color));
}
