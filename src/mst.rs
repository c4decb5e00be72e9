// src/mst.rs
//! Минимальное остовное дерево (алгоритм Прима на двоичной куче)
//!
//! Работает в локальных индексах одного кольца. Ограничение на степень вершины
//! соблюдается, пока это не мешает связности: ребро, у которого хотя бы один
//! конец уже заполнен, откладывается и берётся только тогда, когда иначе
//! часть кольца осталась бы недостижимой.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Ребро-кандидат между локальными вершинами `a` и `b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    weight: f64,
    index: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    // BinaryHeap — max-куча, поэтому порядок перевёрнут: меньший вес (и индекс) выше
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Состояние роста дерева; можно продолжать с расширенным набором кандидатов
#[derive(Debug, Clone)]
pub struct Prim {
    pub reached: Vec<bool>,
    /// Индексы выбранных кандидатов в порядке добавления
    pub chosen: Vec<usize>,
    /// Сколько раз пришлось превысить ограничение степени
    pub over_cap: usize,
}

impl Prim {
    #[must_use]
    pub fn new(node_count: usize, root: usize) -> Self {
        let mut reached = vec![false; node_count];
        if let Some(r) = reached.get_mut(root) {
            *r = true;
        }
        Self {
            reached,
            chosen: Vec::new(),
            over_cap: 0,
        }
    }

    /// Делает вершину ещё одним корнем; `false`, если она уже достигнута
    pub fn add_root(&mut self, node: usize) -> bool {
        match self.reached.get_mut(node) {
            Some(r) if !*r => {
                *r = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.reached.iter().all(|&r| r)
    }

    /// Наращивает дерево по кандидатам `candidates`.
    /// `degree` — текущие степени вершин (учитывает уже активные рёбра), обновляется.
    pub fn grow(&mut self, candidates: &[Candidate], degree: &mut [usize], max_degree: usize) {
        let mut adjacency = vec![Vec::new(); self.reached.len()];
        for (i, c) in candidates.iter().enumerate() {
            adjacency[c.a].push(i);
            adjacency[c.b].push(i);
        }

        let mut heap: BinaryHeap<HeapEntry> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| self.reached[c.a] != self.reached[c.b])
            .map(|(index, c)| HeapEntry {
                weight: c.weight,
                index,
            })
            .collect();
        let mut deferred: Vec<HeapEntry> = Vec::new();

        loop {
            let entry = match heap.pop() {
                Some(entry) => entry,
                None => {
                    // Куча пуста: берём лучший отложенный кандидат, если он ещё что-то соединяет
                    deferred.retain(|e| {
                        let c = candidates[e.index];
                        self.reached[c.a] != self.reached[c.b]
                    });
                    let Some(best) = deferred.iter().copied().max() else {
                        break;
                    };
                    deferred.retain(|e| e.index != best.index);
                    self.over_cap += 1;
                    let to = self.accept(candidates, best.index, degree);
                    self.push_frontier(candidates, &adjacency[to], &mut heap);
                    continue;
                }
            };

            let c = candidates[entry.index];
            if self.reached[c.a] == self.reached[c.b] {
                continue;
            }
            // новая вершина тоже могла заполниться переходами из соседнего кольца
            if degree[c.a] >= max_degree || degree[c.b] >= max_degree {
                deferred.push(entry);
                continue;
            }

            let to = self.accept(candidates, entry.index, degree);
            self.push_frontier(candidates, &adjacency[to], &mut heap);
        }
    }

    /// Присоединяет кандидата, у которого достигнут ровно один конец; возвращает новую вершину
    fn accept(&mut self, candidates: &[Candidate], index: usize, degree: &mut [usize]) -> usize {
        let c = candidates[index];
        let to = if self.reached[c.a] { c.b } else { c.a };
        self.reached[to] = true;
        degree[c.a] += 1;
        degree[c.b] += 1;
        self.chosen.push(index);
        to
    }

    fn push_frontier(
        &self,
        candidates: &[Candidate],
        incident: &[usize],
        heap: &mut BinaryHeap<HeapEntry>,
    ) {
        for &i in incident {
            let c = candidates[i];
            if self.reached[c.a] != self.reached[c.b] {
                heap.push(HeapEntry {
                    weight: c.weight,
                    index: i,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(a: usize, b: usize, weight: f64) -> Candidate {
        Candidate { a, b, weight }
    }

    #[test]
    fn picks_true_minimum_each_round() {
        // квадрат с диагональю: 0-1 (1), 1-2 (2), 2-3 (1), 3-0 (3), 0-2 (1.5)
        let candidates = [
            cand(0, 1, 1.0),
            cand(1, 2, 2.0),
            cand(2, 3, 1.0),
            cand(3, 0, 3.0),
            cand(0, 2, 1.5),
        ];
        let mut degree = vec![0; 4];
        let mut prim = Prim::new(4, 0);
        prim.grow(&candidates, &mut degree, 4);

        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![0, 4, 2]);
        assert_eq!(degree, vec![2, 1, 2, 1]);
        assert_eq!(prim.over_cap, 0);
    }

    #[test]
    fn degree_cap_reroutes_through_longer_edges() {
        let candidates = [
            cand(0, 1, 1.0),
            cand(0, 2, 1.0),
            cand(0, 3, 1.0),
            cand(2, 3, 5.0),
            cand(3, 4, 5.0),
        ];
        let mut degree = vec![0; 5];
        let mut prim = Prim::new(5, 0);
        prim.grow(&candidates, &mut degree, 2);

        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![0, 1, 3, 4]);
        assert_eq!(degree, vec![2, 1, 2, 2, 1]);
        assert_eq!(prim.over_cap, 0);
    }

    #[test]
    fn cap_is_exceeded_only_for_connectivity() {
        let candidates = [cand(0, 1, 1.0), cand(0, 2, 1.0)];
        let mut degree = vec![0; 3];
        let mut prim = Prim::new(3, 0);
        prim.grow(&candidates, &mut degree, 1);

        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![0, 1]);
        assert_eq!(prim.over_cap, 1);
    }

    #[test]
    fn saturated_new_node_counts_as_over_cap() {
        // вершина 1 уже заполнена рёбрами снаружи
        let candidates = [cand(0, 1, 1.0), cand(0, 2, 4.0), cand(2, 1, 4.0)];
        let mut degree = vec![0, 1, 0];
        let mut prim = Prim::new(3, 0);
        prim.grow(&candidates, &mut degree, 1);

        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![1, 0]);
        assert_eq!(prim.over_cap, 1);
        assert_eq!(degree, vec![2, 2, 1]);
    }

    #[test]
    fn extra_roots_grow_separate_components() {
        let candidates = [cand(0, 1, 1.0), cand(2, 3, 1.0)];
        let mut degree = vec![0; 4];
        let mut prim = Prim::new(4, 0);
        prim.grow(&candidates, &mut degree, 4);
        assert!(!prim.is_complete());

        assert!(prim.add_root(3));
        assert!(!prim.add_root(1));
        prim.grow(&candidates, &mut degree, 4);
        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![0, 1]);
        assert_eq!(prim.over_cap, 0);
    }

    #[test]
    fn can_continue_with_more_candidates() {
        let kept = [cand(0, 1, 1.0)];
        let all = [cand(0, 1, 1.0), cand(1, 2, 10.0)];
        let mut degree = vec![0; 3];
        let mut prim = Prim::new(3, 0);
        prim.grow(&kept, &mut degree, 4);
        assert!(!prim.is_complete());

        prim.grow(&all, &mut degree, 4);
        assert!(prim.is_complete());
        assert_eq!(prim.chosen, vec![0, 1]);
    }

    #[test]
    fn empty_and_single_node() {
        let mut prim = Prim::new(1, 0);
        prim.grow(&[], &mut [0], 4);
        assert!(prim.is_complete());
        assert!(prim.chosen.is_empty());
    }
}
