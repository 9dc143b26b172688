// src/lexer/tables/io.rs
use std::{
    io::{BufWriter, Write},
    time::Instant,
};

use log::info;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::DfaTables;

// -------------------- JSON (de)serialization --------------------

#[serde_as]
#[derive(Serialize, Deserialize)]
struct TablesDisk {
    #[serde_as(as = "[_; 256]")]
    latin1_class: [u32; 256],
    class_ranges: Vec<(u32, u32, u32)>,
    n_classes: u32,
    next: Vec<u32>,
    token_of: Vec<u32>,
    token_names: Vec<String>,
    start: u32,
}
impl From<&DfaTables> for TablesDisk {
    fn from(t: &DfaTables) -> Self {
        Self {
            latin1_class: t.latin1_class,
            class_ranges: t.class_ranges.clone(),
            n_classes: t.n_classes,
            next: t.next.clone(),
            token_of: t.token_of.clone(),
            token_names: t.token_names.clone(),
            start: t.start,
        }
    }
}
impl TablesDisk {
    fn into_tables(self) -> DfaTables {
        DfaTables {
            latin1_class: self.latin1_class,
            class_ranges: self.class_ranges,
            n_classes: self.n_classes,
            next: self.next,
            token_of: self.token_of,
            token_names: self.token_names,
            start: self.start,
        }
    }
}

pub fn save_tables_json(path: &std::path::Path, t: &DfaTables) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, &TablesDisk::from(t))?;
    w.flush()
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<DfaTables, String> {
    let tables = serde_json::from_slice::<TablesDisk>(data)
        .map(|d| d.into_tables())
        .map_err(|e| format!("Failed to parse tables JSON: {e}"))?;
    tables.validate()?;
    Ok(tables)
}

// -------------------- Compact binary (little-endian u32) --------------------
//
// magic | n_states n_classes start n_names | names (len + utf8)* |
// latin1_class[256] | n_ranges (lo hi class)* | next[n_states*n_classes] | token_of[n_states]

const BIN_MAGIC: &[u8; 8] = b"LXGDFA01";

fn put_u32(w: &mut impl Write, v: u32) -> std::io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn too_big(what: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{what} exceeds u32::MAX"),
    )
}

pub fn save_tables_bin(path: &std::path::Path, t: &DfaTables) -> std::io::Result<()> {
    let instant = Instant::now();
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);

    let n_states = u32::try_from(t.n_states()).map_err(|_| too_big("state count"))?;
    let n_names = u32::try_from(t.token_names.len()).map_err(|_| too_big("token count"))?;

    // Header
    w.write_all(BIN_MAGIC)?;
    put_u32(&mut w, n_states)?;
    put_u32(&mut w, t.n_classes)?;
    put_u32(&mut w, t.start)?;
    put_u32(&mut w, n_names)?;

    for name in &t.token_names {
        let len = u32::try_from(name.len()).map_err(|_| too_big("token name"))?;
        put_u32(&mut w, len)?;
        w.write_all(name.as_bytes())?;
    }

    for &class in &t.latin1_class {
        put_u32(&mut w, class)?;
    }

    let n_ranges = u32::try_from(t.class_ranges.len()).map_err(|_| too_big("range count"))?;
    put_u32(&mut w, n_ranges)?;
    for &(lo, hi, class) in &t.class_ranges {
        put_u32(&mut w, lo)?;
        put_u32(&mut w, hi)?;
        put_u32(&mut w, class)?;
    }

    // next: stream in chunks to reduce syscalls
    const CHUNK: usize = 1 << 16;
    {
        let mut bytes = Vec::with_capacity(CHUNK * 4);
        for chunk in t.next.chunks(CHUNK) {
            bytes.clear();
            for &v in chunk {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            w.write_all(&bytes)?;
        }
    }

    for &tk in &t.token_of {
        put_u32(&mut w, tk)?;
    }

    let flush = w.flush();
    info!(
        "Saved tables to {} in {} ms",
        path.display(),
        instant.elapsed().as_millis()
    );
    flush
}

pub fn load_tables_bin_bytes(mut data: &[u8]) -> Result<DfaTables, String> {
    if data.len() < 8 + 4 * 4 {
        return Err("bin too short".into());
    }
    if &data[..8] != BIN_MAGIC {
        return Err("bad magic in tables .bin".into());
    }
    data = &data[8..];

    let read_u32 = |buf: &mut &[u8]| -> Result<u32, String> {
        if buf.len() < 4 {
            return Err("truncated u32".into());
        }
        let mut le = [0u8; 4];
        le.copy_from_slice(&buf[..4]);
        *buf = &buf[4..];
        Ok(u32::from_le_bytes(le))
    };

    let n_states = read_u32(&mut data)? as usize;
    let n_classes = read_u32(&mut data)?;
    let start = read_u32(&mut data)?;
    let n_names = read_u32(&mut data)? as usize;

    let mut token_names = Vec::with_capacity(n_names.min(1024));
    for _ in 0..n_names {
        let len = read_u32(&mut data)? as usize;
        if data.len() < len {
            return Err("truncated token name".into());
        }
        let (raw, rest) = data.split_at(len);
        let name = std::str::from_utf8(raw).map_err(|e| format!("token name is not UTF-8: {e}"))?;
        token_names.push(name.to_string());
        data = rest;
    }

    let mut latin1_class = [0u32; 256];
    for slot in latin1_class.iter_mut() {
        *slot = read_u32(&mut data)?;
    }

    let n_ranges = read_u32(&mut data)? as usize;
    let mut class_ranges = Vec::with_capacity(n_ranges.min(1 << 16));
    for _ in 0..n_ranges {
        let lo = read_u32(&mut data)?;
        let hi = read_u32(&mut data)?;
        let class = read_u32(&mut data)?;
        class_ranges.push((lo, hi, class));
    }

    let cells = n_states
        .checked_mul(n_classes as usize)
        .ok_or("n_states*n_classes overflow")?;
    // next + token_of, checked before either is allocated
    let need = cells
        .checked_add(n_states)
        .and_then(|n| n.checked_mul(4))
        .ok_or("state table size overflow")?;
    if data.len() < need {
        return Err(format!(
            "truncated state tables: need {need} bytes for {n_states} states, have {}",
            data.len()
        ));
    }
    let mut next = Vec::with_capacity(cells);
    for _ in 0..cells {
        next.push(read_u32(&mut data)?);
    }

    let mut token_of = Vec::with_capacity(n_states);
    for _ in 0..n_states {
        token_of.push(read_u32(&mut data)?);
    }

    let tables = DfaTables {
        latin1_class,
        class_ranges,
        n_classes,
        next,
        token_of,
        token_names,
        start,
    };
    tables.validate()?;
    Ok(tables)
}
