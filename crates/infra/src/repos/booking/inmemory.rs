use super::IBookingRepo;
use carebook_domain::{Booking, BookingStatus};
use std::sync::Mutex;

pub struct InMemoryBookingRepo {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingRepo {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryBookingRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IBookingRepo for InMemoryBookingRepo {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
        let mut bookings = self.bookings.lock().unwrap();
        bookings.push(booking.clone());
        Ok(())
    }

    async fn find_confirmed_in_window(&self, from: i64, until: i64) -> Vec<Booking> {
        let bookings = self.bookings.lock().unwrap();
        bookings
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Confirmed && b.start_ts >= from && b.start_ts <= until
            })
            .cloned()
            .collect()
    }
}
