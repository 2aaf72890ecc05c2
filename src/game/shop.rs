//! Shop Items
//!
//! Shop offers share a base (slot, cost, currency) and differ in payload.
//! On the wire the variant tag comes first so the reader knows which payload
//! follows.

use crate::content::{GlobalId, CLASS_CHEST, CLASS_RESOURCE};
use crate::core::stream::{ByteStream, CodecError, CodecResult};

/// Fields shared by every offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShopItemBase {
    /// Position in the shop.
    pub shop_index: i32,
    /// Price.
    pub cost: i32,
    /// Currency the price is paid in.
    pub buy_resource: Option<GlobalId>,
}

/// Variant payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopItemKind {
    /// Card offer.
    Spell {
        /// Card on offer.
        spell: GlobalId,
        /// Copies per purchase.
        count: i32,
    },
    /// Currency offer.
    Resource {
        /// Amount granted.
        amount: i32,
        /// Granted without payment.
        free: bool,
    },
    /// Chest offer.
    Chest {
        /// Chest on offer.
        chest: GlobalId,
    },
}

impl ShopItemKind {
    /// Wire tag.
    pub fn tag(&self) -> i32 {
        match self {
            ShopItemKind::Spell { .. } => 1,
            ShopItemKind::Resource { .. } => 2,
            ShopItemKind::Chest { .. } => 3,
        }
    }
}

/// A shop offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShopItem {
    /// Shared fields.
    pub base: ShopItemBase,
    /// Variant payload.
    pub kind: ShopItemKind,
}

impl ShopItem {
    /// Currency offer.
    pub fn resource(
        shop_index: i32,
        cost: i32,
        buy_resource: Option<GlobalId>,
        amount: i32,
        free: bool,
    ) -> Self {
        Self {
            base: ShopItemBase { shop_index, cost, buy_resource },
            kind: ShopItemKind::Resource { amount, free },
        }
    }

    /// Card offer.
    pub fn spell(
        shop_index: i32,
        cost: i32,
        buy_resource: Option<GlobalId>,
        spell: GlobalId,
        count: i32,
    ) -> Self {
        Self {
            base: ShopItemBase { shop_index, cost, buy_resource },
            kind: ShopItemKind::Spell { spell, count },
        }
    }

    /// Chest offer.
    pub fn chest(
        shop_index: i32,
        cost: i32,
        buy_resource: Option<GlobalId>,
        chest: GlobalId,
    ) -> Self {
        Self {
            base: ShopItemBase { shop_index, cost, buy_resource },
            kind: ShopItemKind::Chest { chest },
        }
    }

    /// Encode tag, base, then payload.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_vint(self.kind.tag());

        stream.write_vint(self.base.shop_index);
        stream.write_vint(self.base.cost);
        stream.write_data_ref(self.base.buy_resource);

        match self.kind {
            ShopItemKind::Spell { spell, count } => {
                stream.write_data_ref(Some(spell));
                stream.write_vint(count);
            }
            ShopItemKind::Resource { amount, free } => {
                stream.write_vint(amount);
                stream.write_boolean(free);
            }
            ShopItemKind::Chest { chest } => {
                stream.write_data_ref(Some(chest));
            }
        }
    }

    /// Decode an offer written by [`ShopItem::encode`].
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let tag = stream.read_vint()?;
        if !(1..=3).contains(&tag) {
            return Err(CodecError::UnknownVariant { what: "shop item", tag });
        }

        let base = ShopItemBase {
            shop_index: stream.read_vint()?,
            cost: stream.read_vint()?,
            buy_resource: stream.read_data_ref_of(CLASS_RESOURCE)?,
        };

        let kind = match tag {
            1 => {
                let spell = match stream.read_data_ref()? {
                    Some(id) if id.is_card() => id,
                    other => {
                        return Err(CodecError::DataClassMismatch {
                            expected: crate::content::CLASS_CHARACTER,
                            got: other.map_or(0, GlobalId::class_id),
                        })
                    }
                };
                ShopItemKind::Spell {
                    spell,
                    count: stream.read_vint()?,
                }
            }
            2 => ShopItemKind::Resource {
                amount: stream.read_vint()?,
                free: stream.read_boolean()?,
            },
            _ => ShopItemKind::Chest {
                chest: stream
                    .read_data_ref_of(CLASS_CHEST)?
                    .ok_or(CodecError::DataClassMismatch { expected: CLASS_CHEST, got: 0 })?,
            },
        };

        Ok(Self { base, kind })
    }
}
