//! The `pythoncapi_compat.h` compatibility header
//!
//! The header backports newer C API functions to older Python versions. It
//! is never generated here: rewritten files only gain an include directive
//! and projects are expected to vendor the header themselves.

/// File name of the compatibility header
pub const COMPAT_HEADER: &str = "pythoncapi_compat.h";

/// Where the header can be downloaded from
pub const COMPAT_URL: &str =
    "https://raw.githubusercontent.com/pythoncapi/pythoncapi_compat/master/pythoncapi_compat.h";

/// The include line inserted into patched files
pub const INCLUDE_QUOTED: &str = "#include \"pythoncapi_compat.h\"";

/// Alternative spelling that also satisfies the requirement
pub const INCLUDE_ANGLED: &str = "#include <pythoncapi_compat.h>";

/// Whether the text already includes the header under either spelling
pub fn has_compat_include(text: &str) -> bool {
    text.contains(INCLUDE_QUOTED) || text.contains(INCLUDE_ANGLED)
}

/// Prepend the include line, followed by an empty line
pub fn insert_compat_include(text: &str) -> String {
    format!("{INCLUDE_QUOTED}\n\n{text}")
}
