//! Extraction of embedded raster images from a decoded container.
//!
//! Image items with `external == 0` reference a data block holding raw RGBA
//! pixels; everything else only names an asset shipped with the game.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::info;

use crate::container::Item;
use crate::error::{MapError, Result};
use crate::mapfile::ITEM_TYPE_IMAGE;

/// One embedded image recovered from a container.
pub struct EmbeddedImage {
    pub name: String,
    pub image: RgbaImage,
}

/// Collect all embedded (non-external) images from decoded items and data.
pub fn embedded_images(items: &[Item], data: &[Vec<u8>]) -> Result<Vec<EmbeddedImage>> {
    let mut images = Vec::new();
    for item in items.iter().filter(|item| item.type_id == ITEM_TYPE_IMAGE) {
        if item.payload.len() < 6 {
            return Err(MapError::MalformedContainer(format!(
                "image item {} has {} payload words, expected 6",
                item.id,
                item.payload.len()
            )));
        }
        let width = item.payload[1];
        let height = item.payload[2];
        let external = item.payload[3];
        let name_index = item.payload[4];
        let data_index = item.payload[5];
        let name = block_name(data, name_index)?;
        if external != 0 {
            info!("skipping external image '{}'", name);
            continue;
        }
        let pixels = data
            .get(data_index as usize)
            .ok_or_else(|| {
                MapError::MalformedContainer(format!(
                    "image '{}' references missing data block {}",
                    name, data_index
                ))
            })?
            .clone();
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            MapError::MalformedContainer(format!(
                "image '{}' data does not match {}x{} RGBA",
                name, width, height
            ))
        })?;
        images.push(EmbeddedImage { name, image });
    }
    Ok(images)
}

/// Write every embedded image of a decoded map next to the map file as
/// `<mapstem>_<name>.png`. Returns the written paths.
pub fn save_images(map_path: &Path, items: &[Item], data: &[Vec<u8>]) -> Result<Vec<PathBuf>> {
    let stem = map_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string());
    let dir = map_path.parent().unwrap_or_else(|| Path::new("."));

    let mut written = Vec::new();
    for embedded in embedded_images(items, data)? {
        let out = dir.join(format!("{}_{}.png", stem, embedded.name));
        embedded
            .image
            .save(&out)
            .map_err(|err| match err {
                image::ImageError::IoError(io_err) => MapError::Io(io_err),
                other => MapError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    other.to_string(),
                )),
            })?;
        info!("saved embedded image to {}", out.display());
        written.push(out);
    }
    Ok(written)
}

/// Read a NUL-terminated name string from the referenced data block.
fn block_name(data: &[Vec<u8>], index: u32) -> Result<String> {
    let block = data.get(index as usize).ok_or_else(|| {
        MapError::MalformedContainer(format!("name references missing data block {}", index))
    })?;
    let end = block
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(block.len());
    Ok(String::from_utf8_lossy(&block[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Item;

    fn image_item(id: u16, width: u32, height: u32, external: u32, name: u32, data: u32) -> Item {
        Item::new(id, ITEM_TYPE_IMAGE, vec![1, width, height, external, name, data])
    }

    #[test]
    fn test_embedded_image_recovered() {
        let items = vec![image_item(0, 2, 2, 0, 0, 1)];
        let data = vec![b"bricks\0".to_vec(), vec![255u8; 2 * 2 * 4]];
        let images = embedded_images(&items, &data).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "bricks");
        assert_eq!(images[0].image.dimensions(), (2, 2));
        assert_eq!(images[0].image.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_external_image_skipped() {
        let items = vec![image_item(0, 1024, 1024, 1, 0, u32::MAX)];
        let data = vec![b"desert_main\0".to_vec()];
        let images = embedded_images(&items, &data).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let items = vec![image_item(0, 4, 4, 0, 0, 1)];
        let data = vec![b"bad\0".to_vec(), vec![0u8; 7]];
        assert!(matches!(
            embedded_images(&items, &data),
            Err(MapError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_missing_block_rejected() {
        let items = vec![image_item(0, 2, 2, 0, 5, 1)];
        let data = vec![b"x\0".to_vec(), vec![0u8; 16]];
        assert!(matches!(
            embedded_images(&items, &data),
            Err(MapError::MalformedContainer(_))
        ));
    }
}
