use {
    crate::{
        format::XRGB8888,
        video::{LINEAR_MODIFIER, Modifier},
        vulkan::format::{VulkanFormat, VulkanMaxExtent, VulkanModifier},
    },
    ash::vk::FormatFeatureFlags,
};

fn modifier(modifier: Modifier, planes: usize) -> VulkanModifier {
    VulkanModifier {
        modifier,
        planes,
        features: FormatFeatureFlags::empty(),
        max_extent: VulkanMaxExtent {
            width: 16384,
            height: 16384,
        },
    }
}

#[test]
fn find_modifier_routes_by_usage_class() {
    let ccs = 0x0100_0000_0000_0001;
    let format = VulkanFormat {
        format: XRGB8888,
        render_modifiers: vec![modifier(LINEAR_MODIFIER, 1)],
        texture_modifiers: vec![modifier(LINEAR_MODIFIER, 1), modifier(ccs, 2)],
    };
    assert!(format.find_modifier(LINEAR_MODIFIER, true).is_some());
    assert!(format.find_modifier(ccs, true).is_none());
    let tex = format.find_modifier(ccs, false).unwrap();
    assert_eq!(tex.planes, 2);
}

#[test]
fn find_modifier_absent() {
    let format = VulkanFormat {
        format: XRGB8888,
        render_modifiers: vec![],
        texture_modifiers: vec![],
    };
    assert!(format.find_modifier(LINEAR_MODIFIER, true).is_none());
    assert!(format.find_modifier(LINEAR_MODIFIER, false).is_none());
}
