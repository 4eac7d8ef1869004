//! Request/response DTOs
//!
//! Wire format is camelCase JSON. Field-level constraints live here as
//! `validator` derives so handlers can reject malformed payloads before any
//! component runs.

pub mod auth;
pub mod cart;
pub mod order;
pub mod product;

pub use auth::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, ResetPasswordRequest, UserPublic,
};
pub use cart::{
    AddItemRequest, CartConflict, CartItemInput, ConflictResolution, MergeGuestRequest,
    MergeStrategy, SyncCartRequest, UpdateItemRequest,
};
pub use order::{
    AddressInput, CreateOrderRequest, OrderItemInput, OrderStatus, PaymentInput, PaymentStatus,
    ShippingInput, TotalsInput, UpdateOrderRequest,
};
pub use product::{ProductCreateRequest, ProductUpdateRequest, VariantInput};
