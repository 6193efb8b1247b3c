//! Filesystem-backed sidecar repository.
//!
//! The sidecar for a body at `<path>` lives at `<path>.meta`. Writes go to a
//! temporary sibling first and are renamed into place.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::common::config::AppCfg;
use crate::common::error::{MetaError, MetaResult};

use super::codec::{self, EncodeOptions};
use super::domain::{MetaRepo, MetadataDescriptor};

/// Filesystem repository; relative data paths resolve under `cfg.data_root`.
pub struct FsMetaRepo {
    root: PathBuf,
    encode: EncodeOptions,
}

impl FsMetaRepo {
    pub fn new(cfg: &AppCfg) -> Self {
        Self {
            root: PathBuf::from(&cfg.data_root),
            encode: EncodeOptions {
                compact_schema: cfg.compact_schema,
            },
        }
    }

    /// `<body>.meta`; the suffix is appended, never substituted for an extension.
    pub fn metadata_path(&self, data_path: &Path) -> PathBuf {
        with_suffix(&self.body_path(data_path), ".meta")
    }

    fn ensure_parent(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

impl MetaRepo for FsMetaRepo {
    /// Absolute paths are kept; relative ones resolve under the data root.
    fn body_path(&self, data_path: &Path) -> PathBuf {
        if data_path.is_absolute() {
            data_path.to_path_buf()
        } else {
            self.root.join(data_path)
        }
    }

    fn has_meta(&self, data_path: &Path) -> bool {
        self.metadata_path(data_path).is_file()
    }

    fn has_body(&self, data_path: &Path) -> bool {
        self.body_path(data_path).exists()
    }

    fn read_meta(&self, data_path: &Path) -> MetaResult<MetadataDescriptor> {
        let path = self.metadata_path(data_path);
        let text =
            fs::read_to_string(&path).map_err(|err| MetaError::io(path.display().to_string(), &err))?;
        codec::decode(&text)
    }

    fn write_meta(&self, data_path: &Path, descriptor: &MetadataDescriptor) -> MetaResult<()> {
        let text = codec::encode_with(descriptor, self.encode)?;
        let path = self.metadata_path(data_path);
        let tmp = with_suffix(&path, ".tmp");
        let io_err = |p: &Path| {
            let shown = p.display().to_string();
            move |err: io::Error| MetaError::io(shown, &err)
        };

        Self::ensure_parent(&path).map_err(io_err(&path))?;
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(io_err(&tmp))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(io_err(&tmp))?;
        drop(file);
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        // TODO: fsync the parent directory so the rename itself survives power loss.
        Ok(())
    }
}
