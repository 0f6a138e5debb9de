//! Global constants used throughout the cotton codebase.
//!
//! This module collects the reserved context keys, tag names and default
//! settings shared by the parser, the render node and the configuration
//! layer. Defining them centrally keeps the tag syntax and the context
//! contract exposed to component templates in one place.

/// Default directory (relative to each template root) holding component templates.
pub const DEFAULT_COTTON_DIR: &str = "cotton";

/// File extension appended to every resolved component path.
pub const COMPONENT_TEMPLATE_EXTENSION: &str = "html";

/// Declared component path meaning "resolve the target from the `is` attribute".
pub const DYNAMIC_COMPONENT_PATH: &str = "component";

/// Attribute naming the real target of a dynamic component.
pub const DYNAMIC_TARGET_ATTR: &str = "is";

/// Context key holding the rendered default slot.
pub const SLOT_KEY: &str = "slot";

/// Context key holding the pre-formatted attribute string.
pub const ATTRS_KEY: &str = "attrs";

/// Context key holding the structured attribute mapping.
pub const ATTRS_DICT_KEY: &str = "attrs_dict";

/// Prefix marking an attribute whose value is resolved against the context.
pub const DYNAMIC_ATTR_PREFIX: char = ':';

/// Flag token marking a slot as a deferred expression attribute.
pub const EXPRESSION_ATTR_FLAG: &str = "expression_attr";

/// Opening tag of a component invocation.
pub const COMPONENT_TAG: &str = "cotton_component";

/// Closing tag of a component invocation.
pub const END_COMPONENT_TAG: &str = "end_cotton_component";

/// Opening tag of a named slot.
pub const SLOT_TAG: &str = "cotton_slot";

/// Closing tag of a named slot.
pub const END_SLOT_TAG: &str = "end_cotton_slot";

/// Prefix of HTML-like component elements (`<c-button>`).
pub const HTML_COMPONENT_PREFIX: &str = "c-";

/// HTML-like element name of a named slot (`<c-slot name="...">`).
pub const HTML_SLOT_ELEMENT: &str = "slot";

/// Default maximum nesting depth of component renders within one pass.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default template root searched by the filesystem loader.
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Environment variable overriding the configured component directory.
pub const COTTON_DIR_ENV: &str = "COTTON_DIR";

/// Environment variable pointing at a configuration file.
pub const COTTON_CONFIG_PATH_ENV: &str = "COTTON_CONFIG_PATH";

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "cotton.toml";
