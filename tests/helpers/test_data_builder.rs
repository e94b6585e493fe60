// ==========================================
// テストデータ構築器 - 集成テスト用
// ==========================================

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use worktime_insight::domain::record::WorkRecord;

// ==========================================
// WorkRecord 構築器
// ==========================================

pub struct RecordBuilder {
    work_date: NaiveDate,
    staff_name: String,
    department: Option<String>,
    category1: Option<String>,
    category2: Option<String>,
    work_name: Option<String>,
    unit_price: Option<f64>,
    quantity: f64,
    total_amount: Option<f64>,
    status: Option<String>,
    source_month: Option<String>,
}

impl RecordBuilder {
    pub fn new(work_name: &str, hours: f64) -> Self {
        Self {
            work_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            staff_name: "山田".to_string(),
            department: Some("制作部".to_string()),
            category1: Some("通常".to_string()),
            category2: None,
            work_name: Some(work_name.to_string()),
            unit_price: None,
            quantity: hours,
            total_amount: None,
            status: None,
            source_month: Some("4月請求".to_string()),
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.work_date = date;
        self
    }

    pub fn staff(mut self, name: &str) -> Self {
        self.staff_name = name.to_string();
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn category1(mut self, category1: &str) -> Self {
        self.category1 = Some(category1.to_string());
        self
    }

    pub fn category2(mut self, category2: &str) -> Self {
        self.category2 = Some(category2.to_string());
        self
    }

    pub fn unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn total_amount(mut self, amount: f64) -> Self {
        self.total_amount = Some(amount);
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn source_month(mut self, month: &str) -> Self {
        self.source_month = Some(month.to_string());
        self
    }

    pub fn build(self) -> WorkRecord {
        WorkRecord {
            record_id: Uuid::new_v4().to_string(),
            work_date: self.work_date,
            staff_name: self.staff_name,
            department: self.department,
            category1: self.category1,
            category2: self.category2,
            work_name: self.work_name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            total_amount: self.total_amount,
            status: self.status,
            source_month: self.source_month,
            created_at: Utc::now().naive_utc(),
        }
    }
}
