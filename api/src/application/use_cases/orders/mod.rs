pub mod list_orders;
pub mod place_order;
