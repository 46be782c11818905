use alloy_primitives::{
    map::{HashMap, HashSet},
    Address, Log, U256,
};
use std::vec::Vec;

/// Transaction substate accumulated by a frame: logs, gas refunds, the
/// self-destruct and create sets, and inheritor refunds.
///
/// Substate is merged into the parent when the frame completes successfully
/// and discarded wholesale on revert or exceptional halt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Substate {
    logs: Vec<Log>,
    gas_refund: u64,
    self_destructs: HashSet<Address>,
    creates: HashSet<Address>,
    refunds: HashMap<Address, U256>,
}

impl Substate {
    /// Returns a new, empty substate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a log.
    pub fn add_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Accumulates logs in order.
    pub fn add_logs(&mut self, logs: impl IntoIterator<Item = Log>) {
        self.logs.extend(logs);
    }

    /// The accumulated logs, in emission order.
    #[inline]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Clears the accumulated logs.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// Increments the gas refund.
    #[inline]
    pub fn increment_gas_refund(&mut self, amount: u64) {
        self.gas_refund += amount;
    }

    /// The accumulated gas refund.
    #[inline]
    pub fn gas_refund(&self) -> u64 {
        self.gas_refund
    }

    /// Clears the accumulated gas refund.
    pub fn clear_gas_refund(&mut self) {
        self.gas_refund = 0;
    }

    /// Adds `address` to the self-destruct set. Idempotent.
    pub fn add_self_destruct(&mut self, address: Address) {
        debug_assert!(!self.creates.contains(&address));
        self.self_destructs.insert(address);
    }

    /// Adds every address to the self-destruct set.
    pub fn add_self_destructs(&mut self, addresses: impl IntoIterator<Item = Address>) {
        self.self_destructs.extend(addresses);
    }

    /// The self-destruct set.
    #[inline]
    pub fn self_destructs(&self) -> &HashSet<Address> {
        &self.self_destructs
    }

    /// Removes all entries from the self-destruct set.
    pub fn clear_self_destructs(&mut self) {
        self.self_destructs.clear();
    }

    /// Adds `address` to the create set. Idempotent.
    pub fn add_create(&mut self, address: Address) {
        debug_assert!(!self.self_destructs.contains(&address));
        self.creates.insert(address);
    }

    /// Adds every address to the create set.
    pub fn add_creates(&mut self, addresses: impl IntoIterator<Item = Address>) {
        self.creates.extend(addresses);
    }

    /// The create set.
    #[inline]
    pub fn creates(&self) -> &HashSet<Address> {
        &self.creates
    }

    /// Removes all entries from the create set.
    pub fn clear_creates(&mut self) {
        self.creates.clear();
    }

    /// Whether this frame recorded the creation of `address`.
    #[inline]
    pub fn contains_create(&self, address: &Address) -> bool {
        self.creates.contains(address)
    }

    /// Records a refund owed to `beneficiary`, last write wins.
    pub fn add_refund(&mut self, beneficiary: Address, amount: U256) {
        self.refunds.insert(beneficiary, amount);
    }

    /// The refunds map.
    #[inline]
    pub fn refunds(&self) -> &HashMap<Address, U256> {
        &self.refunds
    }

    /// Folds a successfully completed child's substate into this one: logs
    /// appended in order, sets unioned, refunds merged last-write-wins and
    /// the gas refund accumulated.
    pub fn absorb(&mut self, child: &Substate) {
        self.logs.extend(child.logs.iter().cloned());
        self.gas_refund += child.gas_refund;
        self.self_destructs.extend(child.self_destructs.iter().copied());
        self.creates.extend(child.creates.iter().copied());
        for (beneficiary, amount) in child.refunds.iter() {
            self.refunds.insert(*beneficiary, *amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::LogData;

    fn log_for(address: Address) -> Log {
        Log {
            address,
            data: LogData::new_unchecked(Vec::new(), alloy_primitives::Bytes::new()),
        }
    }

    #[test]
    fn logs_keep_order() {
        let mut substate = Substate::new();
        substate.add_log(log_for(Address::with_last_byte(1)));
        substate.add_logs([
            log_for(Address::with_last_byte(2)),
            log_for(Address::with_last_byte(3)),
        ]);
        let order: Vec<u8> = substate.logs().iter().map(|l| l.address[19]).collect();
        assert_eq!(order, [1, 2, 3]);
        substate.clear_logs();
        assert!(substate.logs().is_empty());
    }

    #[test]
    fn refund_accumulates_and_clears() {
        let mut substate = Substate::new();
        substate.increment_gas_refund(4800);
        substate.increment_gas_refund(200);
        assert_eq!(substate.gas_refund(), 5000);
        substate.clear_gas_refund();
        assert_eq!(substate.gas_refund(), 0);
    }

    #[test]
    fn destruct_and_create_sets_are_idempotent() {
        let mut substate = Substate::new();
        let a = Address::with_last_byte(1);
        let b = Address::with_last_byte(2);
        substate.add_self_destruct(a);
        substate.add_self_destruct(a);
        substate.add_create(b);
        substate.add_create(b);
        assert_eq!(substate.self_destructs().len(), 1);
        assert_eq!(substate.creates().len(), 1);
        assert!(substate.contains_create(&b));
    }

    #[test]
    fn absorb_merges_everything() {
        let mut parent = Substate::new();
        parent.add_log(log_for(Address::with_last_byte(1)));
        parent.increment_gas_refund(100);
        parent.add_refund(Address::with_last_byte(9), U256::from(1));

        let mut child = Substate::new();
        child.add_log(log_for(Address::with_last_byte(2)));
        child.increment_gas_refund(50);
        child.add_create(Address::with_last_byte(5));
        child.add_self_destruct(Address::with_last_byte(6));
        child.add_refund(Address::with_last_byte(9), U256::from(2));

        parent.absorb(&child);
        assert_eq!(parent.logs().len(), 2);
        assert_eq!(parent.logs()[1].address, Address::with_last_byte(2));
        assert_eq!(parent.gas_refund(), 150);
        assert!(parent.creates().contains(&Address::with_last_byte(5)));
        assert!(parent.self_destructs().contains(&Address::with_last_byte(6)));
        assert_eq!(
            parent.refunds()[&Address::with_last_byte(9)],
            U256::from(2)
        );
    }
}
