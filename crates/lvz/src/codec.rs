//! Conversion between the compressed container and the domain [`Package`].

use bon::Builder;
use flate2::Compression;
use tracing::{debug, instrument, warn};

use crate::compression;
use crate::error::{Error, Result};
use crate::object_table::{self, TableVersion};
use crate::package::{Package, Resource};
use crate::read::{CompressedPackage, CompressedSection};

/// Headroom allowed over a section's recorded size before inflating it is abandoned
const INFLATE_SLACK: usize = 64 * 1024;

/// Options for how a package should be compressed
#[derive(Debug, Clone, Copy, Builder)]
pub struct CompressOptions {
    /// Deflate effort from 0 (store) to 9 (smallest output)
    #[builder(default = 9)]
    pub level: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Sections [`inflate_with_report`] could not turn into package contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflateReport {
    /// Unnamed sections whose content is not an object table
    pub unrecognized_sections: usize,

    /// Sections whose deflate stream failed to decode, or unnamed object tables that
    /// failed to parse
    pub corrupt_sections: usize,
}

impl InflateReport {
    /// Whether every section ended up in the package
    pub fn is_clean(&self) -> bool {
        self.unrecognized_sections == 0 && self.corrupt_sections == 0
    }
}

/// Parse a container held in memory. Fails only when the input is not a container at all.
pub fn read(bytes: &[u8]) -> Result<CompressedPackage> {
    CompressedPackage::from_bytes(bytes)
}

/// Serialize a container
pub fn write(package: &CompressedPackage) -> Result<Vec<u8>> {
    package.to_bytes()
}

/// Decompress every section of `package`, dropping the ones that cannot be decoded.
pub fn inflate(package: &CompressedPackage) -> Package {
    inflate_with_report(package).0
}

/// Decompress every section of `package`, reporting the ones that had to be dropped.
///
/// Object tables are recognised by content alone. Any other named section becomes a
/// [`Resource`], as does a named section that only looks like an object table.
#[instrument(skip_all, fields(package = %package.name(), sections = package.len()))]
pub fn inflate_with_report(package: &CompressedPackage) -> (Package, InflateReport) {
    let mut inflated = Package::new(package.name());
    let mut report = InflateReport::default();

    for (index, section) in package.sections().iter().enumerate() {
        let limit = (section.decompressed_size() as usize)
            .saturating_mul(2)
            .saturating_add(INFLATE_SLACK);
        let data = match compression::inflate_with_limit(section.payload(), limit) {
            Ok(data) => data,
            Err(error) => {
                warn!(index, name = section.file_name(), %error, "dropping section");
                report.corrupt_sections += 1;
                continue;
            }
        };

        if data.len() != section.decompressed_size() as usize {
            debug!(
                index,
                expected = section.decompressed_size(),
                actual = data.len(),
                "section size differs from its header"
            );
        }

        let data = if TableVersion::sniff(&data).is_some() {
            match object_table::decode(&data, &mut inflated) {
                Ok(()) => continue,
                Err(error) if section.file_name().is_empty() => {
                    warn!(index, %error, "dropping unreadable object table");
                    report.corrupt_sections += 1;
                    continue;
                }
                Err(error) => {
                    debug!(index, %error, "keeping table-like section as a resource");
                    data
                }
            }
        } else {
            data
        };

        if section.file_name().is_empty() {
            warn!(index, "dropping unnamed section that is not an object table");
            report.unrecognized_sections += 1;
        } else {
            inflated.resources.push(Resource {
                file_name: section.file_name().to_owned(),
                file_time: section.file_time(),
                data,
            });
        }
    }

    (inflated, report)
}

/// Compress `package` at maximum effort.
pub fn compress(package: &Package) -> Result<CompressedPackage> {
    compress_with(package, CompressOptions::default())
}

/// Compress `package` into a container.
///
/// The object table always comes first with an empty name, followed by one section per
/// resource ordered by file name. Resources must be named, since an unnamed section that
/// is not an object table cannot be read back.
#[instrument(skip(package), fields(package = %package.name), err)]
pub fn compress_with(package: &Package, options: CompressOptions) -> Result<CompressedPackage> {
    let level = Compression::new(options.level.min(9));

    let table = object_table::encode(package)?;
    let mut sections = Vec::with_capacity(package.resources.len() + 1);
    sections.push(compress_section("", 0, &table, level)?);

    if let Some(resource) = package.resources.iter().find(|r| r.file_name.is_empty()) {
        return Err(Error::InvalidName(resource.file_name.clone()));
    }

    let mut resources = package.resources.iter().collect::<Vec<_>>();
    resources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    for resource in resources {
        debug!(
            name = %resource.file_name,
            size = resource.data.len(),
            "compressing resource"
        );
        sections.push(compress_section(
            &resource.file_name,
            resource.file_time,
            &resource.data,
            level,
        )?);
    }

    Ok(CompressedPackage::new(package.name.clone(), sections))
}

fn compress_section(
    file_name: &str,
    file_time: u32,
    data: &[u8],
    level: Compression,
) -> Result<CompressedSection> {
    let decompressed_size = u32::try_from(data.len()).map_err(|_| Error::SectionTooLarge {
        name: file_name.to_owned(),
        size: data.len(),
    })?;
    let payload = compression::deflate(data, level)?;

    Ok(CompressedSection::new(
        file_name,
        file_time,
        decompressed_size,
        payload,
    ))
}
