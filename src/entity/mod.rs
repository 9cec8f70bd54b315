pub mod cart_items;
pub mod feedback;
pub mod inventory_adjustments;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;

pub use cart_items::Entity as CartItems;
pub use feedback::Entity as Feedback;
pub use inventory_adjustments::Entity as InventoryAdjustments;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use products::Entity as Products;
