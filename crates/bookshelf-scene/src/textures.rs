//! Conversion of synthesized rasters into Bevy images

use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bookshelf_core::RasterBuffer;

/// Upload-ready sRGB image with the raster's straight-alpha pixels
pub fn raster_to_image(raster: &RasterBuffer) -> Image {
    Image::new(
        Extent3d {
            width: raster.width(),
            height: raster.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        raster.data().to_vec(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// Same as [`raster_to_image`] but sampled with repeat wrapping, for wood grain
pub fn raster_to_tiling_image(raster: &RasterBuffer) -> Image {
    let mut image = raster_to_image(raster);
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::linear()
    });
    image
}

/// Convert a core color to a Bevy color
pub fn color(rgb: bookshelf_core::Rgb) -> Color {
    Color::srgb_u8(rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::Rgba;

    #[test]
    fn test_image_matches_raster() {
        let raster = RasterBuffer::filled(4, 8, Rgba::new(10, 20, 30, 1.0));
        let image = raster_to_image(&raster);
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 8);
        assert_eq!(image.data.as_deref(), Some(raster.data()));
    }

    #[test]
    fn test_tiling_sampler() {
        let raster = RasterBuffer::new(2, 2);
        let image = raster_to_tiling_image(&raster);
        assert!(matches!(image.sampler, ImageSampler::Descriptor(_)));
    }
}
