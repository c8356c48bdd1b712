use serde::Serialize;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// 页码至少为 1，每页条数限制在 `1..=100`
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// 从查询字符串解析，无法解析或为 0 时使用默认值
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        fn number(s: Option<&str>) -> Option<u32> {
            s.and_then(|s| s.trim().parse().ok()).filter(|n| *n > 0)
        }

        Self::new(
            number(page).unwrap_or(1),
            number(limit).unwrap_or(DEFAULT_LIMIT),
        )
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }

    pub fn info(&self, total: i64) -> PageInfo {
        let limit = self.limit as i64;
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// 列表响应中的分页信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(Pagination::parse(None, None), Pagination::new(1, 10));
        assert_eq!(Pagination::parse(Some("abc"), Some("0")), Pagination::new(1, 10));
        assert_eq!(Pagination::parse(Some(" 2 "), Some("50")), Pagination::new(2, 50));
        assert_eq!(Pagination::parse(Some("-3"), Some("1000")).limit, 100);
    }

    #[test]
    fn page_count_rounds_up() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.info(0).pages, 0);
        assert_eq!(p.info(10).pages, 1);
        assert_eq!(p.info(25).pages, 3);
    }
}
