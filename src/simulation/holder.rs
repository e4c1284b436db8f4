//! Bounded passenger queues shared by stations and metros
//!
//! Holders are the only place a passenger's position changes. A move either
//! lands completely or leaves both queues untouched.

use anyhow::{bail, Result};

use super::types::PassengerId;

pub trait PassengerHolder {
    fn capacity(&self) -> usize;

    fn passengers(&self) -> &[PassengerId];

    fn passengers_mut(&mut self) -> &mut Vec<PassengerId>;

    fn has_room(&self) -> bool {
        self.passengers().len() < self.capacity()
    }

    fn contains_passenger(&self, passenger_id: PassengerId) -> bool {
        self.passengers().contains(&passenger_id)
    }

    fn add_passenger(&mut self, passenger_id: PassengerId) -> Result<()> {
        if !self.has_room() {
            bail!(
                "Holder is full ({} of {}), cannot add passenger {:?}",
                self.passengers().len(),
                self.capacity(),
                passenger_id
            );
        }
        if self.contains_passenger(passenger_id) {
            bail!("Passenger {:?} is already in this holder", passenger_id);
        }
        self.passengers_mut().push(passenger_id);
        Ok(())
    }

    fn remove_passenger(&mut self, passenger_id: PassengerId) -> Result<()> {
        let queue = self.passengers_mut();
        match queue.iter().position(|id| *id == passenger_id) {
            Some(index) => {
                queue.remove(index);
                Ok(())
            }
            None => bail!("Passenger {:?} is not in this holder", passenger_id),
        }
    }

    /// Move a passenger to `other`, keeping queue order for everyone else
    fn move_passenger(
        &mut self,
        passenger_id: PassengerId,
        other: &mut dyn PassengerHolder,
    ) -> Result<()> {
        if !self.contains_passenger(passenger_id) {
            bail!("Passenger {:?} is not in the source holder", passenger_id);
        }
        other.add_passenger(passenger_id)?;
        self.remove_passenger(passenger_id)
    }
}
