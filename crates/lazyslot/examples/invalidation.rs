// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Invalidation Example
//!
//! Demonstrates clearing cached values one at a time, all at once, and automatically when an input
//! changes.

use std::sync::LazyLock;

use lazyslot::{CachedClass, CachedProperty, CachedType, HasSlots, InvalidatingProperty, Slots, un_cache};

#[derive(Default)]
struct Account {
    slots: Slots,
}

impl HasSlots for Account {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}

impl CachedType for Account {
    fn cached_class(&self) -> &CachedClass {
        &ACCOUNT
    }
}

static BALANCE: LazyLock<InvalidatingProperty<Account, i64>> =
    LazyLock::new(|| InvalidatingProperty::new("balance").with_doc("Current balance in cents."));

static DISPLAY: LazyLock<CachedProperty<Account, String>> = LazyLock::new(|| {
    CachedProperty::new("display", |account: &Account| {
        println!("formatting balance...");
        let cents = BALANCE.get(account).unwrap_or_default();
        format!("{}.{:02}", cents / 100, cents % 100)
    })
});

static PIN: LazyLock<CachedProperty<Account, u16>> = LazyLock::new(|| CachedProperty::new("__pin", |_: &Account| 1234));

static ACCOUNT: LazyLock<CachedClass> =
    LazyLock::new(|| CachedClass::new("Account").with_member(DISPLAY.clone()).with_member(PIN.clone()));

fn main() {
    let account = Account::default();

    BALANCE.set(&account, 12_345);
    println!("display = {}", DISPLAY.get(&account));
    println!("display = {}", DISPLAY.get(&account));

    // Writing the input clears every declared cached value.
    BALANCE.set(&account, 500);
    println!("display = {}", DISPLAY.get(&account));

    // Private-style names are stored under a qualified key.
    println!("pin = {} stored as {}", PIN.get(&account), PIN.slot_key());

    let cached: Vec<_> = ACCOUNT.cached_on(&account).iter().map(|member| member.name().to_owned()).collect();
    println!("cached members: {cached:?}");

    // One value at a time, or all at once.
    un_cache(&account, "display");
    println!("cleared {} remaining value(s)", ACCOUNT.delete_cache(&account));
}
