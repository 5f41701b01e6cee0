// ==========================================
// 咖啡拼配分析系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值宽松转换
// 规则: 空值、无法解析、非有限值一律视为转换失败（None）
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    /// 空白字符串标准化为 None
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 文本 → 有限实数
    pub fn coerce_f64(&self, value: Option<&str>) -> Option<f64> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("   ".to_string())), None);
        assert_eq!(cleaner.normalize_null(None), None);
        assert_eq!(
            cleaner.normalize_null(Some(" L01 ".to_string())),
            Some("L01".to_string())
        );
    }

    #[test]
    fn test_coerce_f64() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.coerce_f64(Some(" 120.5 ")), Some(120.5));
        assert_eq!(cleaner.coerce_f64(Some("-3")), Some(-3.0));
        assert_eq!(cleaner.coerce_f64(Some("abc")), None);
        assert_eq!(cleaner.coerce_f64(Some("")), None);
        assert_eq!(cleaner.coerce_f64(Some("NaN")), None);
        assert_eq!(cleaner.coerce_f64(Some("inf")), None);
        assert_eq!(cleaner.coerce_f64(None), None);
    }
}
