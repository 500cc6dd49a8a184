fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PRINTERSCREEN_BUILD_DATE");

    // Reproducible builds can pin the stamp
    let build_date = std::env::var("PRINTERSCREEN_BUILD_DATE")
        .unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string());
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
}
