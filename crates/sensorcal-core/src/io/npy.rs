use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::Mmap;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};
use tracing::debug;

use crate::error::{CalibrationError, Result};

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";
/// Magic (6) + version (2) + v1 header length field (2).
const NPY_PREAMBLE_V1: usize = 10;
/// Magic (6) + version (2) + v2/v3 header length field (4).
const NPY_PREAMBLE_V2: usize = 12;
/// Header (including preamble) is padded to a multiple of this.
const NPY_ALIGNMENT: usize = 64;

/// Element types understood by the reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NpyDtype {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl NpyDtype {
    fn from_code(kind: char, size: usize) -> Option<Self> {
        Some(match (kind, size) {
            ('b', 1) => Self::Bool,
            ('u', 1) => Self::U8,
            ('i', 1) => Self::I8,
            ('u', 2) => Self::U16,
            ('i', 2) => Self::I16,
            ('u', 4) => Self::U32,
            ('i', 4) => Self::I32,
            ('u', 8) => Self::U64,
            ('i', 8) => Self::I64,
            ('f', 4) => Self::F32,
            ('f', 8) => Self::F64,
            _ => return None,
        })
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

impl std::fmt::Display for NpyDtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
            Self::U64 => "uint64",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        write!(f, "{name}")
    }
}

/// Parsed `.npy` header.
#[derive(Clone, Debug)]
pub struct NpyHeader {
    pub version: (u8, u8),
    pub dtype: NpyDtype,
    pub little_endian: bool,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Byte offset of the first element.
    pub data_offset: usize,
}

impl NpyHeader {
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn data_byte_size(&self) -> usize {
        self.element_count() * self.dtype.size()
    }
}

/// Memory-mapped `.npy` file reader.
pub struct NpyReader {
    mmap: Mmap,
    pub header: NpyHeader,
}

impl NpyReader {
    /// Open a `.npy` file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let header = parse_header(&mmap)?;
        if header.fortran_order {
            return Err(CalibrationError::InvalidNpy(
                "Fortran-ordered arrays are not supported".into(),
            ));
        }

        let expected = header.data_offset + header.data_byte_size();
        if mmap.len() < expected {
            return Err(CalibrationError::InvalidNpy(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        debug!(
            "Opened {} ({}, shape {:?})",
            path.display(),
            header.dtype,
            header.shape
        );
        Ok(Self { mmap, header })
    }

    fn data(&self) -> &[u8] {
        let start = self.header.data_offset;
        &self.mmap[start..start + self.header.data_byte_size()]
    }

    /// Decode every element as `f64`.
    pub fn to_f64(&self) -> Result<ArrayD<f64>> {
        let values = if self.header.little_endian {
            decode_f64::<LittleEndian>(self.data(), self.header.dtype)
        } else {
            decode_f64::<BigEndian>(self.data(), self.header.dtype)
        };
        Ok(ArrayD::from_shape_vec(IxDyn(&self.header.shape), values)?)
    }

    /// Decode an integer array whose values all fit in `u8` (e.g. Bayer masks).
    pub fn to_u8(&self) -> Result<ArrayD<u8>> {
        if !self.header.dtype.is_integer() {
            return Err(CalibrationError::UnsupportedDtype(format!(
                "expected an integer array, found {}",
                self.header.dtype
            )));
        }
        let wide = self.to_f64()?;
        if let Some(bad) = wide.iter().find(|v| **v < 0.0 || **v > u8::MAX as f64) {
            return Err(CalibrationError::InvalidNpy(format!(
                "value {bad} does not fit in uint8"
            )));
        }
        Ok(wide.mapv(|v| v as u8))
    }
}

/// Read a `.npy` file as `f64`, whatever its stored dtype.
pub fn read_npy(path: &Path) -> Result<ArrayD<f64>> {
    NpyReader::open(path)?.to_f64()
}

/// Read an integer `.npy` file as `u8`.
pub fn read_npy_u8(path: &Path) -> Result<ArrayD<u8>> {
    NpyReader::open(path)?.to_u8()
}

fn decode_f64<B: ByteOrder>(raw: &[u8], dtype: NpyDtype) -> Vec<f64> {
    let size = dtype.size();
    raw.chunks_exact(size)
        .map(|b| match dtype {
            NpyDtype::Bool | NpyDtype::U8 => b[0] as f64,
            NpyDtype::I8 => b[0] as i8 as f64,
            NpyDtype::U16 => B::read_u16(b) as f64,
            NpyDtype::I16 => B::read_i16(b) as f64,
            NpyDtype::U32 => B::read_u32(b) as f64,
            NpyDtype::I32 => B::read_i32(b) as f64,
            NpyDtype::U64 => B::read_u64(b) as f64,
            NpyDtype::I64 => B::read_i64(b) as f64,
            NpyDtype::F32 => B::read_f32(b) as f64,
            NpyDtype::F64 => B::read_f64(b),
        })
        .collect()
}

fn parse_header(buf: &[u8]) -> Result<NpyHeader> {
    if buf.len() < NPY_PREAMBLE_V1 || &buf[..6] != NPY_MAGIC {
        return Err(CalibrationError::InvalidNpy("Missing NUMPY magic".into()));
    }

    let version = (buf[6], buf[7]);
    let (header_len, preamble) = match version.0 {
        1 => (LittleEndian::read_u16(&buf[8..10]) as usize, NPY_PREAMBLE_V1),
        2 | 3 => {
            if buf.len() < NPY_PREAMBLE_V2 {
                return Err(CalibrationError::InvalidNpy("Header truncated".into()));
            }
            (LittleEndian::read_u32(&buf[8..12]) as usize, NPY_PREAMBLE_V2)
        }
        major => {
            return Err(CalibrationError::InvalidNpy(format!(
                "Unsupported format version {major}.{}",
                version.1
            )))
        }
    };

    let data_offset = preamble + header_len;
    if buf.len() < data_offset {
        return Err(CalibrationError::InvalidNpy("Header truncated".into()));
    }
    let dict = String::from_utf8_lossy(&buf[preamble..data_offset]);

    let descr = dict_value(&dict, "descr")
        .and_then(|v| v.trim().strip_prefix('\'').and_then(|v| v.split('\'').next()))
        .ok_or_else(|| CalibrationError::InvalidNpy("Missing 'descr' in header".into()))?;
    let (dtype, little_endian) = parse_descr(descr)?;

    let fortran_order = match dict_value(&dict, "fortran_order").map(str::trim_start) {
        Some(v) if v.starts_with("True") => true,
        Some(v) if v.starts_with("False") => false,
        _ => {
            return Err(CalibrationError::InvalidNpy(
                "Missing 'fortran_order' in header".into(),
            ))
        }
    };

    let shape = dict_value(&dict, "shape")
        .ok_or_else(|| CalibrationError::InvalidNpy("Missing 'shape' in header".into()))
        .and_then(parse_shape)?;

    Ok(NpyHeader {
        version,
        dtype,
        little_endian,
        fortran_order,
        shape,
        data_offset,
    })
}

/// Text following `'key':` in the header dict.
fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("'{key}':");
    let start = dict.find(&pattern)? + pattern.len();
    Some(&dict[start..])
}

fn parse_descr(descr: &str) -> Result<(NpyDtype, bool)> {
    let mut chars = descr.chars();
    let order = chars.next();
    let kind = chars.next();
    let size = chars.as_str().parse::<usize>().ok();

    let little_endian = match order {
        Some('<') | Some('|') | Some('=') => true,
        Some('>') => false,
        _ => return Err(CalibrationError::UnsupportedDtype(descr.to_string())),
    };

    match (kind, size) {
        (Some(kind), Some(size)) => NpyDtype::from_code(kind, size)
            .map(|dtype| (dtype, little_endian))
            .ok_or_else(|| CalibrationError::UnsupportedDtype(descr.to_string())),
        _ => Err(CalibrationError::UnsupportedDtype(descr.to_string())),
    }
}

fn parse_shape(text: &str) -> Result<Vec<usize>> {
    let open = text
        .find('(')
        .ok_or_else(|| CalibrationError::InvalidNpy("Malformed shape".into()))?;
    let close = text[open..]
        .find(')')
        .ok_or_else(|| CalibrationError::InvalidNpy("Malformed shape".into()))?;

    text[open + 1..open + close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| CalibrationError::InvalidNpy(format!("Bad shape entry '{s}'")))
        })
        .collect()
}

/// Element types that can be written to `.npy` files.
pub trait NpyElement: Copy {
    const DESCR: &'static str;
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()>;
}

impl NpyElement for u8 {
    const DESCR: &'static str = "|u1";
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()> {
        w.write_u8(self)
    }
}

impl NpyElement for u16 {
    const DESCR: &'static str = "<u2";
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()> {
        w.write_u16::<LittleEndian>(self)
    }
}

impl NpyElement for i64 {
    const DESCR: &'static str = "<i8";
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()> {
        w.write_i64::<LittleEndian>(self)
    }
}

impl NpyElement for f32 {
    const DESCR: &'static str = "<f4";
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()> {
        w.write_f32::<LittleEndian>(self)
    }
}

impl NpyElement for f64 {
    const DESCR: &'static str = "<f8";
    fn write_le<W: Write>(self, w: &mut W) -> std::io::Result<()> {
        w.write_f64::<LittleEndian>(self)
    }
}

/// Write an array as a version 1.0 `.npy` file in C order.
pub fn write_npy<T, S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    T: NpyElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&header_bytes(T::DESCR, array.shape()))?;
    for &value in array.iter() {
        value.write_le(&mut writer)?;
    }
    writer.flush()?;

    debug!("Wrote {} (shape {:?})", path.display(), array.shape());
    Ok(())
}

fn header_bytes(descr: &str, shape: &[usize]) -> Vec<u8> {
    let shape_text = match shape {
        [single] => format!("({single},)"),
        dims => format!(
            "({})",
            dims.iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let mut dict = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape_text}, }}");

    // Pad with spaces so that the data starts on an aligned offset, ending in '\n'.
    let unpadded = NPY_PREAMBLE_V1 + dict.len() + 1;
    let padding = (NPY_ALIGNMENT - unpadded % NPY_ALIGNMENT) % NPY_ALIGNMENT;
    dict.push_str(&" ".repeat(padding));
    dict.push('\n');

    let mut buf = Vec::with_capacity(NPY_PREAMBLE_V1 + dict.len());
    buf.extend_from_slice(NPY_MAGIC);
    buf.extend_from_slice(&[1, 0]);
    buf.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    buf.extend_from_slice(dict.as_bytes());
    buf
}
