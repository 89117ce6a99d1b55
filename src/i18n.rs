// ==========================================
// Module đa ngôn ngữ (i18n)
// ==========================================
// Dùng thư viện rust-i18n
// Hỗ trợ tiếng Việt (mặc định) và tiếng Anh
// ==========================================
// Lưu ý: macro rust_i18n::i18n! đã được khởi tạo trong lib.rs
// ==========================================

/// Lấy ngôn ngữ hiện tại
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Đặt ngôn ngữ
///
/// # Tham số
/// - locale: mã ngôn ngữ ("vi-VN" hoặc "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Dịch thông điệp theo khóa
///
/// # Ví dụ
/// ```no_run
/// use contract_pakd::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}
