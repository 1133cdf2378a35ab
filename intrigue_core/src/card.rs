use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

pub type CardId = u32;

/// What playing a card does. Kinds that share a rank share a category, so a
/// guard guess of that number catches either kind.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EffectKind {
    Guess,
    Peek,
    Compare,
    Protect,
    DiscardAndDraw,
    DiscardHand,
    Swap,
    SelfEliminate,
    Mark,
    Noop,
}

#[derive(
    Debug,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
pub enum CardKind {
    #[strum(
        message = "Choose an opponent and guess the number of their card, any number but the Guard's own. If you are right, they are knocked out of the round."
    )]
    Guard,
    #[strum(message = "Choose an opponent and privately look at their hand.")]
    Priest,
    #[strum(
        message = "Choose an opponent and compare hands. The lower card is knocked out of the round; a tie knocks out no one."
    )]
    Baron,
    #[strum(
        message = "You cannot be targeted by other players' cards until your own next turn begins."
    )]
    Handmaid,
    #[strum(
        message = "Choose any player, yourself included. They discard their hand and draw a replacement; discarding the Princess this way knocks them out."
    )]
    Prince,
    #[strum(message = "Choose an opponent and trade hands with them.")]
    King,
    #[strum(
        message = "No effect, but while you hold the Countess you must play her instead of the King or the Prince."
    )]
    Countess,
    #[strum(
        message = "Playing the Princess, or being forced to discard her, knocks you out of the round."
    )]
    Princess,
    #[strum(message = "Counts zero at the end of the round and does nothing when played.")]
    Assassin,
    #[strum(
        message = "Choose an opponent. If they win the round, the round's token goes to you instead."
    )]
    Jester,
    #[strum(message = "Choose an opponent and privately look at their hand.")]
    Cardinal,
    #[strum(
        message = "Choose an opponent and compare hands. The lower card is knocked out of the round; a tie knocks out no one."
    )]
    Baroness,
    #[strum(
        message = "You cannot be targeted by other players' cards until your own next turn begins."
    )]
    Sycophant,
    #[strum(
        message = "No effect when played, but each Count in your discard pile adds one to your final number."
    )]
    Count,
    #[strum(
        message = "No effect when played, but being knocked out with the Constable in your discard pile earns you a token."
    )]
    Constable,
    #[strum(serialize = "Dowager Queen", message = "No effect when played.")]
    DowagerQueen,
    #[strum(
        message = "Choose an opponent. They discard their hand without a replacement; discarding the Princess this way knocks them out."
    )]
    Bishop,
}

impl CardKind {
    pub fn rules() -> String {
        CardKind::iter().map(|k| k.rule()).join("\n")
    }

    pub fn rule(&self) -> String {
        format!(
            "{} [number = {}]: {}",
            self,
            self.rank(),
            self.get_message().unwrap_or("No rule")
        )
    }

    pub fn rank(&self) -> u8 {
        match self {
            CardKind::Guard => 1,
            CardKind::Priest => 2,
            CardKind::Baron => 3,
            CardKind::Handmaid => 4,
            CardKind::Prince => 5,
            CardKind::King => 6,
            CardKind::Countess => 7,
            CardKind::Princess => 8,
            CardKind::Assassin => 0,
            CardKind::Jester => 0,
            CardKind::Cardinal => 2,
            CardKind::Baroness => 3,
            CardKind::Sycophant => 4,
            CardKind::Count => 5,
            CardKind::Constable => 6,
            CardKind::DowagerQueen => 7,
            CardKind::Bishop => 9,
        }
    }

    pub fn effect(&self) -> EffectKind {
        match self {
            CardKind::Guard => EffectKind::Guess,
            CardKind::Priest | CardKind::Cardinal => EffectKind::Peek,
            CardKind::Baron | CardKind::Baroness => EffectKind::Compare,
            CardKind::Handmaid | CardKind::Sycophant => EffectKind::Protect,
            CardKind::Prince => EffectKind::DiscardAndDraw,
            CardKind::Bishop => EffectKind::DiscardHand,
            CardKind::King => EffectKind::Swap,
            CardKind::Princess => EffectKind::SelfEliminate,
            CardKind::Jester => EffectKind::Mark,
            CardKind::Countess
            | CardKind::Assassin
            | CardKind::Count
            | CardKind::Constable
            | CardKind::DowagerQueen => EffectKind::Noop,
        }
    }

    pub fn needs_target(&self) -> bool {
        match self.effect() {
            EffectKind::Guess
            | EffectKind::Peek
            | EffectKind::Compare
            | EffectKind::DiscardAndDraw
            | EffectKind::DiscardHand
            | EffectKind::Swap
            | EffectKind::Mark => true,
            _ => false,
        }
    }

    pub fn allows_self_target(&self) -> bool {
        matches!(
            self.effect(),
            EffectKind::DiscardAndDraw | EffectKind::DiscardHand
        )
    }

    pub fn needs_guess(&self) -> bool {
        self.effect() == EffectKind::Guess
    }

    pub fn blocked_by_countess(&self) -> bool {
        matches!(self, CardKind::King | CardKind::Prince)
    }
}

/// One physical card. Duplicates of a kind are distinct instances; the id is
/// assigned once at deck construction and never changes afterwards.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
}

impl Card {
    pub fn rank(&self) -> u8 {
        self.kind.rank()
    }

    pub fn label(&self) -> String {
        self.kind.to_string()
    }
}

const CLASSIC_KINDS: [CardKind; 8] = [
    CardKind::Guard,
    CardKind::Priest,
    CardKind::Baron,
    CardKind::Handmaid,
    CardKind::Prince,
    CardKind::King,
    CardKind::Countess,
    CardKind::Princess,
];

const PREMIUM_KINDS: [CardKind; 17] = [
    CardKind::Guard,
    CardKind::Priest,
    CardKind::Baron,
    CardKind::Handmaid,
    CardKind::Prince,
    CardKind::King,
    CardKind::Countess,
    CardKind::Princess,
    CardKind::Assassin,
    CardKind::Jester,
    CardKind::Cardinal,
    CardKind::Baroness,
    CardKind::Sycophant,
    CardKind::Count,
    CardKind::Constable,
    CardKind::DowagerQueen,
    CardKind::Bishop,
];

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum CardSet {
    Classic,
    Premium,
}

impl CardSet {
    pub fn kinds(&self) -> &'static [CardKind] {
        match self {
            CardSet::Classic => &CLASSIC_KINDS,
            CardSet::Premium => &PREMIUM_KINDS,
        }
    }

    /// One copy of every kind in the set, plus extra Guards until the Guard
    /// count equals the set size.
    pub fn composition(&self) -> Vec<CardKind> {
        let kinds = self.kinds();
        let mut composition = kinds.to_vec();
        composition.extend(std::iter::repeat(CardKind::Guard).take(kinds.len() - 1));
        composition
    }

    pub fn total_card_count(&self) -> usize {
        self.kinds().len() * 2 - 1
    }

    pub fn build_deck(&self) -> Vec<Card> {
        self.composition()
            .into_iter()
            .enumerate()
            .map(|(id, kind)| Card {
                id: id as CardId,
                kind,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_composition_should_hold_fifteen_cards_with_eight_guards() {
        let composition = CardSet::Classic.composition();

        assert_eq!(composition.len(), 15);
        assert_eq!(composition.len(), CardSet::Classic.total_card_count());
        assert_eq!(
            composition.iter().filter(|k| **k == CardKind::Guard).count(),
            8
        );
        for kind in CLASSIC_KINDS {
            assert!(composition.contains(&kind));
        }
    }

    #[test]
    fn premium_composition_should_scale_guards_to_the_set_size() {
        let composition = CardSet::Premium.composition();

        assert_eq!(composition.len(), 33);
        assert_eq!(
            composition.iter().filter(|k| **k == CardKind::Guard).count(),
            17
        );
    }

    #[test]
    fn build_deck_should_assign_distinct_ids() {
        let deck = CardSet::Classic.build_deck();
        let mut ids: Vec<CardId> = deck.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), deck.len());
    }

    #[test]
    fn ranks_should_match_the_card_table() {
        assert_eq!(CardKind::Guard.rank(), 1);
        assert_eq!(CardKind::Princess.rank(), 8);
        assert_eq!(CardKind::Assassin.rank(), 0);
        assert_eq!(CardKind::Cardinal.rank(), 2);
        assert_eq!(CardKind::Bishop.rank(), 9);
    }

    #[test]
    fn kinds_sharing_a_rank_should_share_an_effect_category() {
        assert_eq!(CardKind::Cardinal.effect(), CardKind::Priest.effect());
        assert_eq!(CardKind::Baroness.effect(), CardKind::Baron.effect());
        assert_eq!(CardKind::Sycophant.effect(), CardKind::Handmaid.effect());
    }

    #[test]
    fn countess_should_block_only_king_and_prince() {
        assert!(CardKind::King.blocked_by_countess());
        assert!(CardKind::Prince.blocked_by_countess());
        assert!(!CardKind::Guard.blocked_by_countess());
        assert!(!CardKind::Countess.blocked_by_countess());
    }

    #[test]
    fn self_targeting_should_only_be_allowed_for_forced_discards() {
        assert!(CardKind::Prince.allows_self_target());
        assert!(CardKind::Bishop.allows_self_target());
        assert!(!CardKind::King.allows_self_target());
        assert!(!CardKind::Guard.allows_self_target());
    }

    #[test]
    fn dowager_queen_should_display_with_a_space() {
        assert_eq!(CardKind::DowagerQueen.to_string(), "Dowager Queen");
    }
}
