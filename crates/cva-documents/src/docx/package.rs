use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::Result;

/// A DOCX zip package opened over borrowed bytes
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Part names in archive order
    pub fn names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            names.push(self.archive.by_index_raw(i)?.name().to_string());
        }
        Ok(names)
    }

    pub fn read_string(&mut self, name: &str) -> Result<String> {
        let mut part = self.archive.by_name(name)?;
        let mut content = String::new();
        part.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Write a new package with `replacements` swapped in. Every other part
    /// is copied without recompression.
    pub fn rebuild(&mut self, replacements: &HashMap<String, Vec<u8>>) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..self.archive.len() {
            let part = self.archive.by_index_raw(i)?;
            match replacements.get(part.name()) {
                Some(data) => {
                    writer.start_file(part.name(), options)?;
                    writer.write_all(data)?;
                }
                None => writer.raw_copy_file(part)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}
