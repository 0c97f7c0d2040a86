use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

use crate::error::{GameError, GameResult};
use crate::types::*;

/// A single bonus question: pick the one real image
#[derive(Debug, Clone, PartialEq)]
pub struct BonusGame {
    pub images: Vec<Image>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BonusOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub avatar: Option<String>,
    pub image_ids: Vec<ImageId>,
}

impl BonusGame {
    /// Parse and range-check a submitted index
    pub fn parse_selection(&self, selected_index: &str) -> GameResult<usize> {
        let index: usize = selected_index
            .trim()
            .parse()
            .map_err(|_| GameError::invalid("Invalid selection"))?;
        if index >= self.images.len() {
            return Err(GameError::invalid(format!(
                "Selection must be between 0 and {}",
                self.images.len().saturating_sub(1)
            )));
        }
        Ok(index)
    }

    pub fn answer<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> BonusOutcome {
        let correct = index == self.correct_index;
        let avatar = if correct {
            BONUS_AVATARS.choose(rng).map(|a| a.to_string())
        } else {
            None
        };
        BonusOutcome {
            correct,
            correct_index: self.correct_index,
            avatar,
            image_ids: self.images.iter().map(|i| i.id.clone()).collect(),
        }
    }
}

/// Pick one real and `choices - 1` AI images, preferring ones the user has not seen
pub fn select_bonus_images<R: Rng + ?Sized>(
    all_images: &[Image],
    seen: &HashSet<ImageId>,
    choices: usize,
    rng: &mut R,
) -> Option<BonusGame> {
    if choices < 2 {
        return None;
    }

    let pick = |kind: ImageKind, count: usize, rng: &mut R| -> Option<Vec<Image>> {
        let (mut fresh, mut stale): (Vec<&Image>, Vec<&Image>) = all_images
            .iter()
            .filter(|i| i.kind == kind)
            .partition(|i| !seen.contains(&i.id));
        if fresh.len() + stale.len() < count {
            return None;
        }
        fresh.shuffle(&mut *rng);
        stale.shuffle(&mut *rng);
        Some(
            fresh
                .into_iter()
                .chain(stale)
                .take(count)
                .cloned()
                .collect(),
        )
    };

    let real = pick(ImageKind::Real, 1, &mut *rng)?;
    let mut images = pick(ImageKind::Ai, choices - 1, &mut *rng)?;
    images.extend(real.iter().cloned());
    images.shuffle(&mut *rng);

    let real_id = &real[0].id;
    let correct_index = images.iter().position(|i| &i.id == real_id)?;

    Some(BonusGame {
        images,
        correct_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn image(id: &str, kind: ImageKind) -> Image {
        Image {
            id: id.to_string(),
            kind,
            url: format!("/img/{}.jpg", id),
        }
    }

    fn pool() -> Vec<Image> {
        vec![
            image("r1", ImageKind::Real),
            image("r2", ImageKind::Real),
            image("a1", ImageKind::Ai),
            image("a2", ImageKind::Ai),
            image("a3", ImageKind::Ai),
            image("a4", ImageKind::Ai),
        ]
    }

    #[test]
    fn test_select_has_exactly_one_real() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let game = select_bonus_images(&pool(), &HashSet::new(), 4, &mut rng).unwrap();
            assert_eq!(game.images.len(), 4);
            let reals: Vec<usize> = game
                .images
                .iter()
                .enumerate()
                .filter(|(_, i)| i.kind == ImageKind::Real)
                .map(|(idx, _)| idx)
                .collect();
            assert_eq!(reals, vec![game.correct_index]);
        }
    }

    #[test]
    fn test_select_prefers_unseen() {
        let mut rng = StdRng::seed_from_u64(5);
        let seen: HashSet<ImageId> = ["r1", "a1", "a2"].iter().map(|s| s.to_string()).collect();
        for _ in 0..20 {
            let game = select_bonus_images(&pool(), &seen, 3, &mut rng).unwrap();
            let ids: HashSet<&str> = game.images.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, ["r2", "a3", "a4"].into_iter().collect());
        }
    }

    #[test]
    fn test_select_not_enough_images() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(select_bonus_images(&pool(), &HashSet::new(), 6, &mut rng).is_none());
        assert!(select_bonus_images(&pool(), &HashSet::new(), 1, &mut rng).is_none());
        let only_ai: Vec<Image> = pool()
            .into_iter()
            .filter(|i| i.kind == ImageKind::Ai)
            .collect();
        assert!(select_bonus_images(&only_ai, &HashSet::new(), 2, &mut rng).is_none());
    }

    #[test]
    fn test_parse_selection() {
        let mut rng = StdRng::seed_from_u64(1);
        let game = select_bonus_images(&pool(), &HashSet::new(), 4, &mut rng).unwrap();
        assert_eq!(game.parse_selection("3").unwrap(), 3);
        assert_eq!(game.parse_selection(" 0 ").unwrap(), 0);
        assert!(matches!(
            game.parse_selection("4"),
            Err(GameError::InvalidInput(_))
        ));
        assert!(game.parse_selection("-1").is_err());
        assert!(game.parse_selection("left").is_err());
    }

    #[test]
    fn test_answer_awards_avatar_only_when_correct() {
        let mut rng = StdRng::seed_from_u64(2);
        let game = select_bonus_images(&pool(), &HashSet::new(), 4, &mut rng).unwrap();

        let right = game.answer(game.correct_index, &mut rng);
        assert!(right.correct);
        let avatar = right.avatar.unwrap();
        assert!(BONUS_AVATARS.contains(&avatar.as_str()));

        let wrong_index = (game.correct_index + 1) % game.images.len();
        let wrong = game.answer(wrong_index, &mut rng);
        assert!(!wrong.correct);
        assert!(wrong.avatar.is_none());
        assert_eq!(wrong.correct_index, game.correct_index);
        assert_eq!(wrong.image_ids.len(), 4);
    }
}
