//! Forms shared by the test modules.
use crate::{
    catalog::Industry,
    schema::{BrandForm, KocForm},
};

pub fn valid_koc() -> KocForm {
    let mut form = KocForm {
        full_name: "Nguyễn Văn A".to_string(),
        phone: "0912345678".to_string(),
        email: "a@example.com".to_string(),
        channel_link: "https://tiktok.com/@vana".to_string(),
        channel_id: "@vana".to_string(),
        shipping_address: "12 Lý Thường Kiệt, Hoàn Kiếm, Hà Nội".to_string(),
        follower_count: "12500".to_string(),
        ..KocForm::default()
    };
    form.toggle_industry(Industry::Fashion, true);
    form.toggle_industry(Industry::Beauty, true);
    form
}

pub fn valid_brand() -> BrandForm {
    BrandForm {
        brand_name: "Cocoon".to_string(),
        contact_person: "Trần Thị B".to_string(),
        phone: "0987654321".to_string(),
        email: "b@cocoon.vn".to_string(),
        industry: "Làm đẹp".to_string(),
        expected_budget: "15000000".to_string(),
        ..BrandForm::default()
    }
}
