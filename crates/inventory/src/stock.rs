use serde::{Deserialize, Serialize};

use ironmonger_core::ProductId;

/// Coarse stock bucket shown in the stock report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    NoStock,
    Low,
    Medium,
    High,
}

impl StockLevel {
    pub const LOW_THRESHOLD: i64 = 10;
    pub const MEDIUM_THRESHOLD: i64 = 50;

    /// `0` (or less) → no stock, `< 10` → low, `< 50` → medium, else high.
    pub fn classify(stock: i64) -> Self {
        if stock <= 0 {
            StockLevel::NoStock
        } else if stock < Self::LOW_THRESHOLD {
            StockLevel::Low
        } else if stock < Self::MEDIUM_THRESHOLD {
            StockLevel::Medium
        } else {
            StockLevel::High
        }
    }

    /// Label printed on the report and shown in the status chip.
    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::NoStock => "Sin stock",
            StockLevel::Low => "Stock bajo",
            StockLevel::Medium => "Stock medio",
            StockLevel::High => "Stock alto",
        }
    }

    /// Command-line spelling.
    pub fn name(&self) -> &'static str {
        match self {
            StockLevel::NoStock => "no-stock",
            StockLevel::Low => "low",
            StockLevel::Medium => "medium",
            StockLevel::High => "high",
        }
    }
}

impl core::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for StockLevel {
    type Err = String;

    /// Accepts the command-line names as well as the printed labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "no stock" | "none" | "out" | "sin stock" => Ok(StockLevel::NoStock),
            "low" | "stock bajo" | "bajo" => Ok(StockLevel::Low),
            "medium" | "stock medio" | "medio" => Ok(StockLevel::Medium),
            "high" | "stock alto" | "alto" => Ok(StockLevel::High),
            other => Err(format!("unknown stock level '{other}'")),
        }
    }
}

/// One product line of the stock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_id: ProductId,
    pub name: String,
    pub stock: i64,
}

impl StockRow {
    pub fn level(&self) -> StockLevel {
        StockLevel::classify(self.stock)
    }
}

/// Filter criteria the report was generated with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilters {
    /// Free-text search over id and name.
    pub q: Option<String>,
    pub id_filter: Option<String>,
    pub name_filter: Option<String>,
    pub status: Option<StockLevel>,
    pub stock_min: Option<i64>,
    pub stock_max: Option<i64>,
}

impl StockFilters {
    pub fn is_empty(&self) -> bool {
        self.chips().is_empty()
    }

    /// One label per active criterion, in display order.
    pub fn chips(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if let Some(id) = non_blank(&self.id_filter) {
            chips.push(format!("ID contiene: {id}"));
        }
        if let Some(name) = non_blank(&self.name_filter) {
            chips.push(format!("Nombre contiene: {name}"));
        }
        if let Some(status) = self.status {
            chips.push(format!("Estado: {status}"));
        }
        if self.stock_min.is_some() || self.stock_max.is_some() {
            let min = self.stock_min.unwrap_or(0).to_string();
            let max = self
                .stock_max
                .map_or_else(|| "\u{221e}".to_string(), |max| max.to_string());
            chips.push(format!("Rango: {min}\u{2013}{max}"));
        }
        if let Some(q) = non_blank(&self.q) {
            chips.push(format!("B\u{fa}squeda: {q}"));
        }
        chips
    }

    pub fn matches(&self, row: &StockRow) -> bool {
        let id = row.product_id.to_string();
        let name = row.name.to_lowercase();

        if let Some(q) = non_blank(&self.q) {
            let needle = q.to_lowercase();
            if !id.contains(&needle) && !name.contains(&needle) {
                return false;
            }
        }
        if non_blank(&self.id_filter).is_some_and(|wanted| !id.contains(wanted)) {
            return false;
        }
        if non_blank(&self.name_filter).is_some_and(|wanted| !name.contains(&wanted.to_lowercase())) {
            return false;
        }
        self.status.is_none_or(|status| row.level() == status)
            && self.stock_min.is_none_or(|min| row.stock >= min)
            && self.stock_max.is_none_or(|max| row.stock <= max)
    }

    pub fn apply<'a>(&'a self, rows: &'a [StockRow]) -> impl Iterator<Item = &'a StockRow> + 'a {
        rows.iter().filter(move |row| self.matches(row))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Summary appended after the report table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockTotals {
    pub rows: usize,
    pub units: i64,
}

impl StockTotals {
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a StockRow>) -> Self {
        rows.into_iter().fold(Self::default(), |acc, row| Self {
            rows: acc.rows + 1,
            units: acc.units + row.stock.max(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(id: i64, name: &str, stock: i64) -> StockRow {
        StockRow {
            product_id: ProductId::new(id),
            name: name.to_string(),
            stock,
        }
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(StockLevel::classify(0), StockLevel::NoStock);
        assert_eq!(StockLevel::classify(9), StockLevel::Low);
        assert_eq!(StockLevel::classify(10), StockLevel::Medium);
        assert_eq!(StockLevel::classify(49), StockLevel::Medium);
        assert_eq!(StockLevel::classify(50), StockLevel::High);
        assert_eq!(StockLevel::classify(-3), StockLevel::NoStock);
    }

    #[test]
    fn labels_are_the_printed_spanish_names() {
        assert_eq!(StockLevel::NoStock.label(), "Sin stock");
        assert_eq!(StockLevel::Low.label(), "Stock bajo");
        assert_eq!(StockLevel::Medium.to_string(), "Stock medio");
        assert_eq!(StockLevel::High.label(), "Stock alto");
        assert_eq!(StockLevel::NoStock.name(), "no-stock");
    }

    #[test]
    fn chips_follow_the_report_order() {
        let filters = StockFilters {
            q: Some("mart".into()),
            id_filter: Some("1".into()),
            name_filter: Some("  ".into()),
            status: Some(StockLevel::Low),
            stock_min: None,
            stock_max: Some(20),
        };
        assert_eq!(
            filters.chips(),
            vec![
                "ID contiene: 1",
                "Estado: Stock bajo",
                "Rango: 0\u{2013}20",
                "B\u{fa}squeda: mart",
            ]
        );
        assert!(StockFilters::default().is_empty());
    }

    #[test]
    fn open_ended_range_shows_infinity() {
        let filters = StockFilters {
            stock_min: Some(5),
            ..StockFilters::default()
        };
        assert_eq!(filters.chips(), vec!["Rango: 5\u{2013}\u{221e}"]);
    }

    #[test]
    fn filters_and_totals() {
        let rows = vec![
            row(1, "Brocha 2in", 4),
            row(2, "Rodillo", 60),
            row(3, "Clavo 3in", 0),
            row(12, "Brocha 4in", 15),
        ];

        let by_name = StockFilters {
            name_filter: Some("BROCHA".into()),
            ..StockFilters::default()
        };
        let hits: Vec<_> = by_name.apply(&rows).map(|r| r.product_id.get()).collect();
        assert_eq!(hits, vec![1, 12]);
        assert_eq!(StockTotals::of(by_name.apply(&rows)), StockTotals { rows: 2, units: 19 });

        let by_id = StockFilters {
            id_filter: Some("1".into()),
            stock_min: Some(5),
            ..StockFilters::default()
        };
        let hits: Vec<_> = by_id.apply(&rows).map(|r| r.product_id.get()).collect();
        assert_eq!(hits, vec![12]);

        let by_status = StockFilters {
            status: Some(StockLevel::NoStock),
            ..StockFilters::default()
        };
        assert_eq!(by_status.apply(&rows).count(), 1);

        let search = StockFilters {
            q: Some("rod".into()),
            stock_max: Some(100),
            ..StockFilters::default()
        };
        let hits: Vec<_> = search.apply(&rows).map(|r| r.product_id.get()).collect();
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn level_parses_from_cli_names_and_labels() {
        assert_eq!("no-stock".parse::<StockLevel>(), Ok(StockLevel::NoStock));
        assert_eq!("MEDIUM".parse::<StockLevel>(), Ok(StockLevel::Medium));
        assert_eq!("Stock bajo".parse::<StockLevel>(), Ok(StockLevel::Low));
        assert_eq!("Sin stock".parse::<StockLevel>(), Ok(StockLevel::NoStock));
        assert!("plenty".parse::<StockLevel>().is_err());
    }

    proptest! {
        /// Property: classification is monotonic in the stock count.
        #[test]
        fn classification_is_monotonic(a in -10i64..200, b in -10i64..200) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(StockLevel::classify(lo) <= StockLevel::classify(hi));
        }
    }
}
