use anyhow::{bail, Result};

/// Checks that a format can serve as the canvas: render target, sampled,
/// blendable, and (when `sample_count > 1`) multisampled and resolvable.
pub fn check_format_features(
    format: wgpu::TextureFormat,
    features: &wgpu::TextureFormatFeatures,
    sample_count: u32,
) -> Result<()> {
    let required = wgpu::TextureUsages::RENDER_ATTACHMENT
        | wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_SRC;
    if !features.allowed_usages.contains(required) {
        bail!("{format:?} does not support {required:?}");
    }

    let flags = features.flags;
    if !flags.contains(wgpu::TextureFormatFeatureFlags::BLENDABLE) {
        bail!("{format:?} is not blendable");
    }
    if !flags.contains(wgpu::TextureFormatFeatureFlags::FILTERABLE) {
        bail!("{format:?} is not filterable");
    }

    if sample_count > 1 {
        if !flags.sample_count_supported(sample_count) {
            bail!("{format:?} does not support {sample_count}x multisampling");
        }
        if !flags.contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE) {
            bail!("{format:?} cannot be a multisample resolve target");
        }
    }

    Ok(())
}

/// Queries the adapter and fails if the canvas cannot be created as asked.
pub fn require_canvas_support(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> Result<()> {
    let features = adapter.get_texture_format_features(format);
    check_format_features(format, &features, sample_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{TextureFormatFeatureFlags as F, TextureUsages as U};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    fn features(flags: F) -> wgpu::TextureFormatFeatures {
        wgpu::TextureFormatFeatures {
            allowed_usages: U::RENDER_ATTACHMENT | U::TEXTURE_BINDING | U::COPY_SRC | U::COPY_DST,
            flags,
        }
    }

    #[test]
    fn single_sample_needs_blend_and_filter() {
        assert!(check_format_features(FORMAT, &features(F::BLENDABLE | F::FILTERABLE), 1).is_ok());
        assert!(check_format_features(FORMAT, &features(F::FILTERABLE), 1).is_err());
    }

    #[test]
    fn msaa_needs_sample_count_and_resolve() {
        let base = F::BLENDABLE | F::FILTERABLE;
        assert!(check_format_features(FORMAT, &features(base | F::MULTISAMPLE_X4), 4).is_err());
        assert!(
            check_format_features(
                FORMAT,
                &features(base | F::MULTISAMPLE_X4 | F::MULTISAMPLE_RESOLVE),
                4
            )
            .is_ok()
        );
    }

    #[test]
    fn missing_usage_is_fatal() {
        let f = wgpu::TextureFormatFeatures {
            allowed_usages: U::TEXTURE_BINDING,
            flags: F::BLENDABLE | F::FILTERABLE,
        };
        assert!(check_format_features(FORMAT, &f, 1).is_err());
    }
}
