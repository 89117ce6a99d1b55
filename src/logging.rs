// ==========================================
// Khởi tạo hệ thống log
// ==========================================
// Dùng tracing và tracing-subscriber
// Mức log cấu hình qua biến môi trường
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Khởi tạo hệ thống log
///
/// # Biến môi trường
/// - RUST_LOG: bộ lọc mức log (mặc định: info)
///   ví dụ: RUST_LOG=debug hoặc RUST_LOG=contract_pakd=trace
///
/// # Ví dụ
/// ```no_run
/// use contract_pakd::logging;
/// logging::init();
/// ```
pub fn init() {
    // Đọc mức log từ biến môi trường, mặc định info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Cấu hình định dạng log
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Khởi tạo log cho môi trường test
///
/// Mức log chi tiết hơn, tiện gỡ lỗi
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
