// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持西班牙语（默认，面向表格使用者）和英语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言（导入错误信息面向西语用户）
pub const DEFAULT_LOCALE: &str = "es";

/// 支持的语言列表
pub const SUPPORTED_LOCALES: &[&str] = &["es", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"es" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 规范化语言代码，不支持的语言回退到默认语言
pub fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| lower == *l || lower.starts_with(&format!("{}-", l)) || lower.starts_with(&format!("{}_", l)))
        .unwrap_or(DEFAULT_LOCALE)
}

/// 翻译消息（无参数，使用当前全局语言）
///
/// # 示例
/// ```no_run
/// use order_line_import::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，使用当前全局语言）
///
/// # 示例
/// ```no_run
/// use order_line_import::i18n::t_with_args;
/// let msg = t_with_args("errors.missing_field", &[("field", "CANTIDAD"), ("row", "4")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_placeholders(rust_i18n::t!(key).to_string(), args)
}

/// 翻译消息（带参数，显式指定语言）
///
/// 导入错误信息按配置语言渲染，不修改全局 locale，
/// 避免并行测试或多会话宿主之间互相干扰。
pub fn t_with_args_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let locale = normalize_locale(locale);
    fill_placeholders(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_placeholders(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对修改全局 locale 的测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("es");
        assert_eq!(current_locale(), "es");
        assert_eq!(t("common.success"), "Operación exitosa");
    }

    #[test]
    fn test_translate_with_explicit_locale() {
        let msg = t_with_args_in(
            "es",
            "errors.missing_field",
            &[("field", "CANTIDAD"), ("row", "4")],
        );
        assert_eq!(msg, "Campo 'CANTIDAD' vacío en fila 4");

        let msg = t_with_args_in(
            "en",
            "errors.missing_field",
            &[("field", "CANTIDAD"), ("row", "4")],
        );
        assert_eq!(msg, "Field 'CANTIDAD' is empty on row 4");
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("es"), "es");
        assert_eq!(normalize_locale("es_PE"), "es");
        assert_eq!(normalize_locale("EN-us"), "en");
        assert_eq!(normalize_locale("zh-CN"), "es");
        assert_eq!(normalize_locale(""), "es");
    }

    #[test]
    fn test_multiline_message_keeps_newlines() {
        let msg = t_with_args_in(
            "es",
            "errors.product_not_found_name",
            &[("row", "7"), ("value", "Unknown Widget")],
        );
        assert!(msg.starts_with("Línea 7: Producto no encontrado\n"));
        assert!(msg.contains("Nombre: 'Unknown Widget'"));
    }
}
