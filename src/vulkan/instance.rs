use {
    crate::vulkan::VulkanError,
    ahash::{AHashMap, AHashSet},
    ash::{
        Entry, Instance, LoadingError,
        vk::{
            API_VERSION_1_1, ApplicationInfo, ExtensionProperties, InstanceCreateInfo,
            LayerProperties, api_version_major, api_version_minor, api_version_patch,
            api_version_variant, make_api_version,
        },
    },
    once_cell::sync::Lazy,
    std::{
        ffi::{CStr, CString},
        fmt::{Display, Formatter},
        rc::Rc,
        slice,
        sync::Arc,
    },
};

pub struct VulkanInstance {
    pub(super) _entry: &'static Entry,
    pub(super) instance: Instance,
}

impl VulkanInstance {
    pub fn new(validation: bool) -> Result<Rc<Self>, VulkanError> {
        static ENTRY: Lazy<Result<Entry, Arc<LoadingError>>> =
            Lazy::new(|| unsafe { Entry::load() }.map_err(Arc::new));
        let entry = match &*ENTRY {
            Ok(e) => e,
            Err(e) => return Err(VulkanError::Load(e.clone())),
        };
        let app_info = ApplicationInfo::default()
            .api_version(API_VERSION)
            .engine_name(c"vulkan_gbm")
            .engine_version(make_api_version(0, 0, 1, 0));
        let mut create_info = InstanceCreateInfo::default().application_info(&app_info);
        let validation_layer_name = VALIDATION_LAYER.as_ptr();
        if validation {
            if get_available_layers(entry)?.contains(VALIDATION_LAYER) {
                create_info =
                    create_info.enabled_layer_names(slice::from_ref(&validation_layer_name));
            } else {
                log::warn!(
                    "Vulkan validation was requested but validation layers are not available"
                );
            }
        }
        let instance = match unsafe { entry.create_instance(&create_info, None) } {
            Ok(i) => i,
            Err(e) => return Err(VulkanError::CreateInstance(e)),
        };
        Ok(Rc::new(Self {
            _entry: entry,
            instance,
        }))
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

pub type Extensions = AHashMap<CString, u32>;

fn get_available_layers(entry: &Entry) -> Result<AHashSet<CString>, VulkanError> {
    unsafe {
        entry
            .enumerate_instance_layer_properties()
            .map_err(VulkanError::InstanceLayers)
            .map(map_layer_properties)
    }
}

fn map_layer_properties(props: Vec<LayerProperties>) -> AHashSet<CString> {
    props
        .into_iter()
        .map(|e| unsafe { CStr::from_ptr(e.layer_name.as_ptr()).to_owned() })
        .collect()
}

pub fn map_extension_properties(props: Vec<ExtensionProperties>) -> Extensions {
    props
        .into_iter()
        .map(|e| {
            let s = unsafe { CStr::from_ptr(e.extension_name.as_ptr()) };
            (s.to_owned(), e.spec_version)
        })
        .collect()
}

pub struct ApiVersionDisplay(pub u32);

impl Display for ApiVersionDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            api_version_variant(self.0),
            api_version_major(self.0),
            api_version_minor(self.0),
            api_version_patch(self.0),
        )
    }
}

pub const API_VERSION: u32 = API_VERSION_1_1;
