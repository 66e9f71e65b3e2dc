use {
    super::{filter_modifiers, plane_aspect, validate_usage},
    crate::{
        backend::{
            BO_USE_CURSOR, BO_USE_LINEAR, BO_USE_PROTECTED, BO_USE_RENDERING, BO_USE_SCANOUT,
            BO_USE_WRITE,
        },
        format::XRGB8888,
        video::{LINEAR_MODIFIER, Modifier},
        vulkan::{
            VulkanError,
            format::{VulkanFormat, VulkanMaxExtent, VulkanModifier},
        },
    },
    ash::vk::{FormatFeatureFlags, ImageAspectFlags},
};

const X_TILED: Modifier = 0x0100_0000_0000_0001;
const Y_TILED: Modifier = 0x0100_0000_0000_0002;

fn modifier(modifier: Modifier, planes: usize, max: u32) -> VulkanModifier {
    VulkanModifier {
        modifier,
        planes,
        features: FormatFeatureFlags::empty(),
        max_extent: VulkanMaxExtent {
            width: max,
            height: max,
        },
    }
}

fn format() -> VulkanFormat {
    VulkanFormat {
        format: XRGB8888,
        render_modifiers: vec![
            modifier(LINEAR_MODIFIER, 1, 16384),
            modifier(X_TILED, 1, 4096),
        ],
        texture_modifiers: vec![
            modifier(LINEAR_MODIFIER, 1, 16384),
            modifier(X_TILED, 1, 4096),
            modifier(Y_TILED, 2, 8192),
        ],
    }
}

#[test]
fn filter_preserves_caller_order() {
    let format = format();
    let mods = filter_modifiers(&format, 64, 64, false, &[Y_TILED, LINEAR_MODIFIER, X_TILED]);
    assert_eq!(mods, vec![Y_TILED, LINEAR_MODIFIER, X_TILED]);
    let mods = filter_modifiers(&format, 64, 64, false, &[LINEAR_MODIFIER, Y_TILED]);
    assert_eq!(mods, vec![LINEAR_MODIFIER, Y_TILED]);
}

#[test]
fn filter_respects_usage_class() {
    let format = format();
    let mods = filter_modifiers(&format, 64, 64, true, &[Y_TILED, LINEAR_MODIFIER]);
    assert_eq!(mods, vec![LINEAR_MODIFIER]);
}

#[test]
fn filter_drops_unknown_modifiers() {
    let format = format();
    let mods = filter_modifiers(&format, 64, 64, false, &[0xdead, LINEAR_MODIFIER]);
    assert_eq!(mods, vec![LINEAR_MODIFIER]);
}

#[test]
fn filter_enforces_max_extent() {
    let format = format();
    let mods = filter_modifiers(
        &format,
        8192,
        8192,
        false,
        &[LINEAR_MODIFIER, X_TILED, Y_TILED],
    );
    assert_eq!(mods, vec![LINEAR_MODIFIER, Y_TILED]);
    let mods = filter_modifiers(&format, 4096, 8192, false, &[X_TILED, Y_TILED]);
    assert_eq!(mods, vec![Y_TILED]);
    let mods = filter_modifiers(
        &format,
        32768,
        32768,
        false,
        &[LINEAR_MODIFIER, X_TILED, Y_TILED],
    );
    assert!(mods.is_empty());
}

#[test]
fn plane_aspects_are_distinct() {
    let aspects: Vec<_> = (0..4).map(|i| plane_aspect(i).unwrap()).collect();
    assert_eq!(aspects[0], ImageAspectFlags::MEMORY_PLANE_0_EXT);
    assert_eq!(aspects[3], ImageAspectFlags::MEMORY_PLANE_3_EXT);
    for i in 0..4 {
        for j in 0..4 {
            if i != j {
                assert_ne!(aspects[i], aspects[j]);
            }
        }
    }
    assert!(plane_aspect(4).is_none());
}

#[test]
fn cpu_usage_is_rejected() {
    assert!(validate_usage(BO_USE_SCANOUT | BO_USE_RENDERING).is_ok());
    assert!(validate_usage(BO_USE_CURSOR | BO_USE_LINEAR).is_ok());
    assert!(matches!(
        validate_usage(BO_USE_WRITE),
        Err(VulkanError::UnsupportedBufferUsage)
    ));
    assert!(matches!(
        validate_usage(BO_USE_SCANOUT | BO_USE_PROTECTED),
        Err(VulkanError::UnsupportedBufferUsage)
    ));
}
