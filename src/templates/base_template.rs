use crate::form::{Notice, NoticeLevel};

/// A dialog-level message as rendered by the base layout.
#[derive(Clone, Debug)]
pub struct FlashMessage {
    pub message: String,
    pub is_error: bool,
}

impl From<Notice> for FlashMessage {
    fn from(n: Notice) -> Self {
        FlashMessage {
            is_error: n.level == NoticeLevel::Error,
            message: n.message,
        }
    }
}

/// Values every page passes to `base.html`.
#[derive(Default)]
pub struct TemplateGlobals {
    pub api_hostname: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
}

/// Base template trait providing common properties for all templates.
pub trait BaseTemplate {
    fn api_hostname(&self) -> &str;
    fn flash_messages(&self) -> &Vec<FlashMessage>;
    fn has_flash_messages(&self) -> bool;
}

/// Macro to implement BaseTemplate for a struct with standard fields
#[macro_export]
macro_rules! impl_base_template {
    ($struct_name:ty) => {
        impl $crate::templates::BaseTemplate for $struct_name {
            fn api_hostname(&self) -> &str {
                &self.api_hostname
            }
            fn flash_messages(&self) -> &Vec<$crate::templates::FlashMessage> {
                &self.flash_messages
            }
            fn has_flash_messages(&self) -> bool {
                self.has_flash_messages
            }
        }
    };
}
