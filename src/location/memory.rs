use async_trait::async_trait;
use std::collections::HashMap;

use super::{LocationError, LocationLevel, LocationOption, LocationService};

/// Fixed location tree held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticLocationService {
    provinces: Vec<LocationOption>,
    districts: HashMap<String, Vec<LocationOption>>,
    wards: HashMap<String, Vec<LocationOption>>,
}

impl StaticLocationService {
    pub fn new() -> Self { Self::default() }

    pub fn with_province(mut self, province: LocationOption, districts: Vec<(LocationOption, Vec<LocationOption>)>) -> Self {
        let mut children = Vec::with_capacity(districts.len());
        for (district, wards) in districts {
            self.wards.insert(district.code.clone(), wards);
            children.push(district);
        }
        self.districts.insert(province.code.clone(), children);
        self.provinces.push(province);
        self
    }
}

#[async_trait]
impl LocationService for StaticLocationService {
    async fn provinces(&self) -> Result<Vec<LocationOption>, LocationError> {
        Ok(self.provinces.clone())
    }

    async fn districts(&self, province_code: &str) -> Result<Vec<LocationOption>, LocationError> {
        self.districts.get(province_code).cloned().ok_or_else(|| LocationError::NotFound { level: LocationLevel::Province, code: province_code.to_string() })
    }

    async fn wards(&self, district_code: &str) -> Result<Vec<LocationOption>, LocationError> {
        self.wards.get(district_code).cloned().ok_or_else(|| LocationError::NotFound { level: LocationLevel::District, code: district_code.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tree_lookup() {
        let svc = StaticLocationService::new().with_province(
            LocationOption::new("01", "Ha Noi"),
            vec![(LocationOption::new("001", "Ba Dinh"), vec![LocationOption::new("00001", "Phuc Xa")])],
        );
        assert_eq!(svc.provinces().await.unwrap().len(), 1);
        assert_eq!(svc.options(LocationLevel::District, Some("01")).await.unwrap()[0].code, "001");
        assert_eq!(svc.wards("001").await.unwrap()[0].name, "Phuc Xa");
        assert!(matches!(svc.districts("99").await, Err(LocationError::NotFound { .. })));
        assert!(svc.options(LocationLevel::Ward, None).await.is_err());
    }
}
