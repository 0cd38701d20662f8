use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SortDirection;

    #[test]
    fn empty_order_is_blank() {
        assert_eq!(FilterOrder::generate(&[]), "");
    }

    #[test]
    fn multiple_columns() {
        let infos = vec![
            FilterOrderInfo { column: "title".into(), sort: SortDirection::Asc },
            FilterOrderInfo { column: "id".into(), sort: SortDirection::Desc },
        ];
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"title\" ASC, \"id\" DESC");
    }
}
