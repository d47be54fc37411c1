mod inmemory;
mod postgres;

pub use inmemory::InMemoryBookingRepo;
pub use postgres::PostgresBookingRepo;

use carebook_domain::Booking;

#[async_trait::async_trait]
pub trait IBookingRepo: Send + Sync {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()>;
    /// Confirmed bookings starting within `[from, until]`
    async fn find_confirmed_in_window(&self, from: i64, until: i64) -> Vec<Booking>;
}
