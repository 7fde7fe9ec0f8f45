use crate::{Catalog, GemDef, PlayerClass, RngState, ShopRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopOffer {
    pub gem: GemDef,
    pub price: i64,
    pub sold: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopState {
    pub offers: Vec<ShopOffer>,
}

impl ShopState {
    /// Roll `offer_slots` gems from the class's shop pool. Duplicates are
    /// allowed; an empty pool yields an empty shop.
    pub fn generate(
        rule: &ShopRule,
        catalog: &Catalog,
        class: PlayerClass,
        unlocked: &[String],
        rng: &mut RngState,
    ) -> Self {
        let mut offers = Vec::with_capacity(rule.offer_slots);
        for _ in 0..rule.offer_slots {
            let Some(gem) = catalog.pick_shop_gem(class, unlocked, rng) else {
                break;
            };
            offers.push(ShopOffer {
                price: gem.price.max(0),
                gem: gem.clone(),
                sold: false,
            });
        }
        Self { offers }
    }

    pub fn available(&self) -> usize {
        self.offers.iter().filter(|offer| !offer.sold).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GemColor;

    #[test]
    fn offers_come_from_pool() {
        let catalog = Catalog::builtin();
        let unlocked = vec!["green-poison".to_string()];
        let mut rng = RngState::from_seed(11);
        let shop = ShopState::generate(
            &ShopRule::default(),
            &catalog,
            PlayerClass::Rogue,
            &unlocked,
            &mut rng,
        );
        assert_eq!(shop.offers.len(), 3);
        assert_eq!(shop.available(), 3);
        for offer in &shop.offers {
            assert!(offer.gem.color == GemColor::Grey || offer.gem.id == "green-poison");
            assert_eq!(offer.price, offer.gem.price);
        }
    }

    #[test]
    fn empty_pool_empty_shop() {
        let mut catalog = Catalog::builtin();
        catalog.gems.clear();
        let mut rng = RngState::from_seed(1);
        let shop = ShopState::generate(
            &ShopRule::default(),
            &catalog,
            PlayerClass::Knight,
            &[],
            &mut rng,
        );
        assert!(shop.offers.is_empty());
    }
}
