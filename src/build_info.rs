//! Build metadata embedded by build.rs

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_SHA: &str = env!("CODEATLAS_GIT_SHA");
pub const BUILD_TIME: &str = env!("CODEATLAS_BUILD_TIME");
pub const BUILD_PROFILE: &str = env!("CODEATLAS_BUILD_PROFILE");

pub fn print_build_info() {
    println!("codeatlas {}", VERSION);
    println!("git: {}", GIT_SHA);
    println!("built: {}", BUILD_TIME);
    println!("profile: {}", BUILD_PROFILE);
}
