//! Shared fixtures for engine unit tests

use rust_decimal::prelude::*;
use shared::order::{
    DraftItem, Order, OrderDraft, OrderItem, OrderStatus, PaymentStatus,
};

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Draft matching [`pending_order`]: Burger ×2 @ 10.00 + Fries ×1 @ 3.00,
/// 10% tax, 5% service charge
pub fn draft() -> OrderDraft {
    OrderDraft {
        items: vec![
            DraftItem {
                menu_item_id: "menu-burger".to_string(),
                name: "Burger".to_string(),
                quantity: 2,
                unit_price: d("10.00"),
            },
            DraftItem {
                menu_item_id: "menu-fries".to_string(),
                name: "Fries".to_string(),
                quantity: 1,
                unit_price: d("3.00"),
            },
        ],
        tax_rate: d("0.10"),
        service_charge_rate: d("0.05"),
        payment_status: PaymentStatus::Unpaid,
    }
}

/// A pending order at version 0: subtotal 23.00, tax 2.30, service 1.15,
/// total 26.45
pub fn pending_order() -> Order {
    let items = vec![
        OrderItem::new("menu-burger", "Burger", 2, d("10.00")),
        OrderItem::new("menu-fries", "Fries", 1, d("3.00")),
    ];
    Order {
        id: uuid::Uuid::new_v4().to_string(),
        status: OrderStatus::Pending,
        version: 0,
        items,
        subtotal: d("23.00"),
        tax: d("2.30"),
        service_charge: d("1.15"),
        total: d("26.45"),
        tax_rate: d("0.10"),
        service_charge_rate: d("0.05"),
        payment_status: PaymentStatus::Unpaid,
        created_at: 0,
        updated_at: 0,
    }
}
