use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{NervError, Result};
use crate::network::model::Model;

//  Binary model file, little-endian throughout:
//    u32              layer count
//    u32 × count      per-layer neuron counts, in network order
//    per layer:       activation buffer (f32 × n), then, for every layer
//                     except the last, its row-major weight matrix
//                     (f32 × next·n)
//  Biases, pre-activations and deltas are not persisted; `load` rebuilds
//  them zero-filled.

/// Writes `model`'s shape, activations and weights to `path`.
pub fn save(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    write_u32(&mut w, model.layer_count() as u32)?;
    for layer in &model.layers {
        write_u32(&mut w, layer.size() as u32)?;
    }

    for layer in &model.layers {
        write_f32_slice(&mut w, &layer.a.data)?;
        if layer.has_weights() {
            write_f32_slice(&mut w, &layer.w.data)?;
        }
    }

    w.flush()?;
    Ok(())
}

/// Reads a model previously written by [`save`]. Shapes are rebuilt from
/// the header; activations and weights come back bit-identical, while
/// biases, pre-activations and deltas are zero-filled (not yet trained
/// state — a loaded model needs a fresh backward pass before `update`).
pub fn load(path: impl AsRef<Path>) -> Result<Model> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut r = BufReader::new(file);

    let layer_count = read_u32(&mut r)? as usize;
    if layer_count == 0 {
        return Err(NervError::Truncated);
    }

    let mut sizes = Vec::new();
    for _ in 0..layer_count {
        sizes.push(read_u32(&mut r)? as usize);
    }

    // The header is untrusted; no buffer is allocated from it until the
    // file is known to hold every byte the declared shapes require.
    match declared_file_len(&sizes) {
        Some(required) if required <= file_len => {}
        _ => return Err(NervError::Truncated),
    }

    let mut model = Model::new(&sizes);
    for layer in &mut model.layers {
        read_f32_slice(&mut r, &mut layer.a.data)?;
        if layer.has_weights() {
            read_f32_slice(&mut r, &mut layer.w.data)?;
        }
    }

    Ok(model)
}

/// Total file size implied by a header with these layer sizes: the header
/// itself, each activation buffer, and each non-last layer's weight matrix.
/// `None` when the declared shapes overflow a byte count.
fn declared_file_len(sizes: &[usize]) -> Option<u64> {
    let mut total = 4u64.checked_add((sizes.len() as u64).checked_mul(4)?)?;
    for (i, &n) in sizes.iter().enumerate() {
        total = total.checked_add((n as u64).checked_mul(4)?)?;
        if let Some(&next) = sizes.get(i + 1) {
            let weights = (n as u64).checked_mul(next as u64)?.checked_mul(4)?;
            total = total.checked_add(weights)?;
        }
    }
    Some(total)
}

fn write_u32(w: &mut impl Write, n: u32) -> Result<()> {
    w.write_all(&n.to_le_bytes())?;
    Ok(())
}

fn write_f32_slice(w: &mut impl Write, values: &[f32]) -> Result<()> {
    for &v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32_slice(r: &mut impl Read, out: &mut [f32]) -> Result<()> {
    let mut buf = [0u8; 4];
    for v in out {
        r.read_exact(&mut buf).map_err(truncated)?;
        *v = f32::from_le_bytes(buf);
    }
    Ok(())
}

fn truncated(e: std::io::Error) -> NervError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        NervError::Truncated
    } else {
        NervError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::prng::Prng;

    #[test]
    fn round_trip_preserves_shapes_activations_and_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let mut model = Model::new(&[3, 4, 2]);
        model.init(&mut Prng::seed(99));
        model.set_input(&[0.25, -1.5, 3.0]).unwrap();
        model.forward().unwrap();

        save(&model, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.layer_sizes(), vec![3, 4, 2]);
        for (orig, copy) in model.layers.iter().zip(&loaded.layers) {
            assert_eq!(orig.a.data, copy.a.data);
            assert_eq!(orig.w, copy.w);
            // Untrained state comes back zeroed.
            assert!(copy.b.iter().all(|&x| x == 0.0));
            assert!(copy.z.iter().all(|&x| x == 0.0));
            assert!(copy.d.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn biases_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let mut model = Model::new(&[2, 2]);
        model.layers[1].b.fill(7.0);
        save(&model, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert!(loaded.layers[1].b.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load("/nonexistent/nerv/model.bin").unwrap_err();
        assert!(matches!(err, NervError::Io(_)));
    }

    #[test]
    fn truncated_payload_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let model = Model::new(&[3, 2]);
        save(&model, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(load(&path).unwrap_err(), NervError::Truncated));
    }

    #[test]
    fn header_declaring_huge_layers_is_rejected_before_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        // 12-byte file: two layers of u32::MAX neurons each, no payload.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(load(&path).unwrap_err(), NervError::Truncated));
    }

    #[test]
    fn header_declaring_more_layers_than_the_file_holds_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(load(&path).unwrap_err(), NervError::Truncated));
    }

    #[test]
    fn declared_file_len_matches_what_save_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let model = Model::new(&[3, 4, 2]);
        save(&model, &path).unwrap();

        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert_eq!(declared_file_len(&[3, 4, 2]), Some(on_disk));
    }

    #[test]
    fn declared_file_len_reports_overflow_as_none() {
        let huge = u32::MAX as usize;
        assert_eq!(declared_file_len(&[huge, huge, huge]), None);
    }

    #[test]
    fn single_layer_model_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.nerv");

        let mut model = Model::new(&[4]);
        model.set_input(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        save(&model, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.layer_sizes(), vec![4]);
        assert_eq!(loaded.layers[0].a.data, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
