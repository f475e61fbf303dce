//! Archive fixtures and filesystem helpers shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autounzip::{ProgressEvent, ProgressSink};

/// One thing to put in a fixture archive
pub enum Item<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

/// Write a ZIP archive holding `items` in order
pub fn write_archive(path: &Path, items: &[Item<'_>], method: zip::CompressionMethod) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default().compression_method(method);
    for item in items {
        match item {
            Item::File(name, content) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
            Item::Dir(name) => {
                writer.add_directory(*name, options).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

/// Deflated archive holding `files`
pub fn write_files(path: &Path, files: &[(&str, &[u8])]) {
    let items: Vec<_> = files.iter().map(|(n, c)| Item::File(*n, *c)).collect();
    write_archive(path, &items, zip::CompressionMethod::Deflated);
}

/// Deterministic, mildly compressible content
pub fn sample_content(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + seed * 7) % 251) as u8).collect()
}

/// Offset of the first occurrence of `needle` in `haystack`
pub fn find(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("pattern not present in archive")
}

/// Every path under `root` (relative), mapped to file contents or `None` for directories
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(relative, None);
                walk(root, &path, out);
            } else {
                out.insert(relative, Some(std::fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

/// A progress sink that keeps every event it sees
pub fn recording_sink() -> (Arc<Mutex<Vec<ProgressEvent>>>, Arc<dyn ProgressSink>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink: Arc<dyn ProgressSink> = Arc::new(move |event: &ProgressEvent| {
        sink_events.lock().unwrap().push(event.clone())
    });
    (events, sink)
}
