use std::fmt;
use std::io::{BufRead, Write};

use crate::error::{NervError, Result};
use crate::math::matrix::Matrix;
use crate::math::vector::Vector;
use crate::network::model::Model;

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vector")?;
        writeln!(f, "Size: {}", self.size())?;
        for x in self.iter() {
            writeln!(f, "[ {x:.6} ]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix")?;
        writeln!(f, "Rows: {}\tColumns: {}", self.rows, self.cols)?;
        for y in 0..self.rows {
            write!(f, "[")?;
            for x in 0..self.cols {
                write!(f, " {:.6} ", self.at(x, y))?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

/// Displayable summary of a model's architecture: layer count and the
/// neuron count of every layer, in network order.
pub struct ModelStructure<'a>(pub &'a Model);

impl fmt::Display for ModelStructure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Structure")?;
        writeln!(f, "Layers: {}", self.0.layer_count())?;
        for (i, layer) in self.0.layers.iter().enumerate() {
            writeln!(f, "Layer {} - Params: {}", i + 1, layer.size())?;
        }
        Ok(())
    }
}

impl Model {
    pub fn structure(&self) -> ModelStructure<'_> {
        ModelStructure(self)
    }
}

/// Interactively reads a vector: its size, then one float per component.
/// Prompts go to `out`; numbers come from whitespace-separated tokens on
/// `input`, so piped and interactive streams both work.
pub fn scan_vector(input: &mut impl BufRead, out: &mut impl Write) -> Result<Vector> {
    write!(out, "Enter size of vector: ")?;
    out.flush()?;
    let size: usize = next_token(input)?;

    let mut v = Vector::zeros(size);
    for i in 0..size {
        write!(out, "{}: ", i + 1)?;
        out.flush()?;
        v[i] = next_token(input)?;
    }
    Ok(v)
}

/// Interactively reads a matrix: rows, columns, then entries row by row.
pub fn scan_matrix(input: &mut impl BufRead, out: &mut impl Write) -> Result<Matrix> {
    write!(out, "Enter rows: ")?;
    out.flush()?;
    let rows: usize = next_token(input)?;
    write!(out, "Enter columns: ")?;
    out.flush()?;
    let cols: usize = next_token(input)?;

    let mut m = Matrix::zeros(rows, cols);
    for y in 0..rows {
        for x in 0..cols {
            write!(out, "{}x{}: ", y + 1, x + 1)?;
            out.flush()?;
            *m.at_mut(x, y) = next_token(input)?;
        }
    }
    Ok(m)
}

/// Interactively reads a model shape: layer count, then one neuron count
/// per layer. The returned model is zero-filled (not yet initialized).
pub fn scan_model(input: &mut impl BufRead, out: &mut impl Write) -> Result<Model> {
    write!(out, "Enter number of layers: ")?;
    out.flush()?;
    let layer_count: usize = next_token(input)?;
    if layer_count == 0 {
        return Err(NervError::InvalidInput("0 layers".into()));
    }

    let mut sizes = Vec::with_capacity(layer_count);
    for i in 0..layer_count {
        write!(out, "Enter size of layer {}: ", i + 1)?;
        out.flush()?;
        sizes.push(next_token(input)?);
    }
    Ok(Model::new(&sizes))
}

/// Reads the next whitespace-separated token and parses it.
fn next_token<T: std::str::FromStr>(input: &mut impl BufRead) -> Result<T> {
    use std::io::Read;

    let mut token = String::new();
    let mut byte = [0u8; 1];
    while input.read(&mut byte)? == 1 {
        let c = byte[0] as char;
        if c.is_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(c);
    }

    if token.is_empty() {
        return Err(NervError::InvalidInput("unexpected end of input".into()));
    }
    token.parse().map_err(|_| NervError::InvalidInput(token))
}
