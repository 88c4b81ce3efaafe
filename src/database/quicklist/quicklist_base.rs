use std::{
    collections::VecDeque,
    fmt,
    ops::{Index, IndexMut},
};

use slab::Slab;
use tracing::{debug, trace};

use super::{Block, Cursor, IntoIter, Iter, QuickListStatistics, ValidationError};
use crate::{
    config::{QuickListConfig, DEFAULT_BLOCK_CAPACITY},
    error::{QuickListError, QuickListResult},
    validate,
};

/// Стабильный дескриптор блока в арене.
pub(crate) type BlockId = usize;

/// Сколько последних перемещений элементов помнит список.
const RELOCATION_HISTORY: usize = 128;

/// Звено цепочки: блок и ссылки на соседей.
///
/// `prev`/`next` только описывают структуру, владеет блоком арена.
/// Ключи арены переиспользуются, поэтому у каждого звена есть поколение:
/// оно уникально за всё время жизни списка.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) block: Block<T>,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
    pub(crate) generation: u64,
    /// Начало отсчёта сохранённых смещений: сдвигается при `shift` и
    /// `unshift`, чтобы позиции в блоке оставались на своих элементах
    pub(crate) origin: usize,
}

/// Место в цепочке: блок, его поколение и смещение в отсчёте блока.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) id: BlockId,
    pub(crate) generation: u64,
    pub(crate) offset: usize,
}

/// Куда переехали элементы блока.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// В блок `id`: смещение `o` становится `o + base` в его отсчёте
    Shift {
        id: BlockId,
        generation: u64,
        base: usize,
    },
    /// В фиксированное место
    Fixed(Position),
    /// Список опустел, обход начинается с головы
    Restart,
}

#[derive(Debug, Clone)]
enum OffsetMap {
    /// Смещения меньше `at` уходят в `low`, остальные в `high`
    Split { at: usize, low: Target, high: Target },
    /// Из блока удалены элементы с этими смещениями (по возрастанию)
    Removed { offsets: Vec<usize>, to: Target },
}

/// Запись о том, что поколение `from` больше не существует.
#[derive(Debug, Clone)]
struct Relocation {
    from: u64,
    origin: usize,
    map: OffsetMap,
}

/// Результат поиска актуального места для сохранённой позиции.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// Живой блок и смещение в нём
    At { id: BlockId, offset: usize },
    Restart,
    /// Запись о перемещении уже вытеснена из истории
    Lost,
}

impl Target {
    fn apply(
        self,
        offset: usize,
    ) -> Option<Position> {
        match self {
            Target::Shift {
                id,
                generation,
                base,
            } => Some(Position {
                id,
                generation,
                offset: offset.wrapping_add(base),
            }),
            Target::Fixed(position) => Some(position),
            Target::Restart => None,
        }
    }
}

impl OffsetMap {
    fn uniform(target: Target) -> Self {
        OffsetMap::Split {
            at: usize::MAX,
            low: target,
            high: target,
        }
    }

    fn apply(
        &self,
        offset: usize,
    ) -> Option<Position> {
        match self {
            OffsetMap::Split { at, low, .. } if offset < *at => low.apply(offset),
            OffsetMap::Split { high, .. } => high.apply(offset),
            OffsetMap::Removed { offsets, to } => {
                to.apply(offset - offsets.partition_point(|&r| r < offset))
            }
        }
    }
}

/// Смещение позиции внутри блока с началом отсчёта `origin`.
///
/// Позиция перед элементом, который уже сняли с головы блока, прижимается
/// к нулю.
#[inline]
fn local_offset(
    offset: usize,
    origin: usize,
) -> usize {
    (offset.wrapping_sub(origin) as isize).max(0) as usize
}

/// Двусвязный список блоков фиксированной ёмкости.
///
/// **ИНВАРИАНТЫ:**
///
/// - в цепочке нет пустых блоков;
/// - ни один блок не содержит больше `block_capacity` элементов вне
///   выполняющейся операции;
/// - в любой паре соседних блоков хотя бы один заполнен не меньше чем
///   наполовину: два недозаполненных соседа всегда помещаются в один блок
///   и сливаются.
///
/// Отрицательный индекс отсчитывается от хвоста: `-1` это последний элемент.
#[derive(Clone)]
pub struct QuickList<T> {
    /// Арена блоков, единственный владелец
    pub(crate) nodes: Slab<Node<T>>,
    pub(crate) head: Option<BlockId>,
    pub(crate) tail: Option<BlockId>,
    /// Общее кол-во элементов во всех блоках
    len: usize,
    block_capacity: usize,
    next_generation: u64,
    /// Поколения ниже этой границы выданы до последнего `clear`
    cleared_below: u64,
    /// Недавние перемещения элементов, по ним курсоры находят своё место
    relocations: VecDeque<Relocation>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<T> QuickList<T> {
    /// Создаёт пустой список с заданной ёмкостью блока.
    ///
    /// Ёмкость меньше единицы поднимается до единицы.
    pub fn new(block_capacity: usize) -> Self {
        let block_capacity = block_capacity.max(1);
        debug!(block_capacity, "QuickList created");

        Self {
            nodes: Slab::new(),
            head: None,
            tail: None,
            len: 0,
            block_capacity,
            next_generation: 0,
            cleared_below: 0,
            relocations: VecDeque::new(),
        }
    }

    /// Создаёт пустой список по конфигурации.
    pub fn with_config(config: &QuickListConfig) -> Self {
        Self::new(config.block_capacity)
    }

    /// Возвращает кол-во элементов.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Проверяет, пуст ли список.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Возвращает кол-во блоков в цепочке.
    #[inline]
    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    /// Возвращает настроенную ёмкость блока.
    #[inline]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Добавляет элемент в конец списка.
    ///
    /// Если хвостовой блок заполнен, сначала создаётся и привязывается новый.
    pub fn push(
        &mut self,
        value: T,
    ) {
        let id = match self.tail {
            Some(id) if self.nodes[id].block.len() < self.block_capacity => id,
            _ => {
                let block = self.new_block();
                self.link_back(block)
            }
        };

        self.nodes[id].block.put_back(value);
        self.len += 1;
    }

    /// Добавляет элемент в начало списка.
    pub fn unshift(
        &mut self,
        value: T,
    ) {
        let id = match self.head {
            Some(id) if self.nodes[id].block.len() < self.block_capacity => id,
            _ => {
                let block = self.new_block();
                self.link_front(block)
            }
        };

        let node = &mut self.nodes[id];
        node.block.put_front(value);
        node.origin = node.origin.wrapping_sub(1);
        self.len += 1;
    }

    /// Удаляет и возвращает последний элемент.
    ///
    /// # Ошибки
    /// - [`QuickListError::EmptySequence`], если список пуст.
    pub fn pop(&mut self) -> QuickListResult<T> {
        let id = self.tail.ok_or(QuickListError::EmptySequence)?;
        let value = self.nodes[id]
            .block
            .pop_back()
            .map_err(|_| QuickListError::EmptySequence)?;

        self.len -= 1;
        if !self.nodes[id].block.is_empty() {
            self.note_truncated(id);
        }
        self.rebalance(id);

        Ok(value)
    }

    /// Удаляет и возвращает первый элемент.
    ///
    /// # Ошибки
    /// - [`QuickListError::EmptySequence`], если список пуст.
    pub fn shift(&mut self) -> QuickListResult<T> {
        let id = self.head.ok_or(QuickListError::EmptySequence)?;
        let node = &mut self.nodes[id];
        let value = node
            .block
            .pop_front()
            .map_err(|_| QuickListError::EmptySequence)?;
        node.origin = node.origin.wrapping_add(1);

        self.len -= 1;
        self.rebalance(id);

        Ok(value)
    }

    /// Возвращает ссылку на элемент по логическому индексу.
    ///
    /// Поиск блока идёт с ближайшего конца цепочки.
    pub fn get(
        &self,
        index: isize,
    ) -> QuickListResult<&T> {
        let (id, offset) = self.locate(index)?;
        self.nodes[id]
            .block
            .get(offset)
            .map_err(|_| self.out_of_range(index))
    }

    /// Возвращает изменяемую ссылку на элемент по логическому индексу.
    pub fn get_mut(
        &mut self,
        index: isize,
    ) -> QuickListResult<&mut T> {
        let (id, offset) = self.locate(index)?;
        let err = self.out_of_range(index);
        self.nodes[id].block.get_mut(offset).map_err(|_| err)
    }

    /// Перезаписывает элемент по логическому индексу и возвращает прежнее
    /// значение.
    pub fn replace_at(
        &mut self,
        value: T,
        index: isize,
    ) -> QuickListResult<T> {
        let (id, offset) = self.locate(index)?;
        let err = self.out_of_range(index);
        self.nodes[id]
            .block
            .replace_at(value, offset)
            .map_err(|_| err)
    }

    /// Первый элемент списка.
    pub fn first(&self) -> Option<&T> {
        self.head.and_then(|id| self.nodes[id].block.first())
    }

    /// Последний элемент списка.
    pub fn last(&self) -> Option<&T> {
        self.tail.and_then(|id| self.nodes[id].block.last())
    }

    /// Удаляет все элементы и блоки.
    pub fn clear(&mut self) {
        let blocks = self.nodes.len();
        self.nodes.clear();
        self.relocations.clear();
        self.cleared_below = self.next_generation;
        self.head = None;
        self.tail = None;
        self.len = 0;
        debug!(blocks, "QuickList cleared");
    }

    /// Оставляет в списке только позиции `[start, stop)` и возвращает кол-во
    /// удалённых элементов.
    ///
    /// # Ошибки
    /// - [`QuickListError::IndexOutOfRange`] при тех же границах, что и у
    ///   [`QuickList::get_range`].
    pub fn trim(
        &mut self,
        start: isize,
        stop: isize,
    ) -> QuickListResult<usize> {
        let (start, stop) = self.check_range(start, stop)?;
        let removed = self.len - (stop - start);

        for _ in stop..self.len {
            self.pop()?;
        }
        for _ in 0..start {
            self.shift()?;
        }

        Ok(removed)
    }

    /// Итератор по элементам от головы к хвосту.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Курсор для обхода, допускающего изменение списка между шагами.
    pub fn cursor(&self) -> Cursor {
        Cursor::new()
    }

    /// Собирает статистику заполнения блоков.
    pub fn statistics(&self) -> QuickListStatistics {
        let mut stats = QuickListStatistics::empty(self.block_capacity);
        let mut min_fill = usize::MAX;

        for (_, node) in self.blocks() {
            let fill = node.block.len();
            stats.block_count += 1;
            stats.element_count += fill;
            min_fill = min_fill.min(fill);
            stats.max_fill = stats.max_fill.max(fill);
            if self.is_underfilled(fill) {
                stats.underfilled_blocks += 1;
            }
        }

        if stats.block_count > 0 {
            stats.min_fill = min_fill;
            stats.average_fill = stats.element_count as f64 / stats.block_count as f64;
        }

        stats
    }

    /// Проверяет структурные инварианты цепочки.
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        let mut count = 0;
        let mut blocks = 0;
        let mut prev: Option<BlockId> = None;

        for (id, node) in self.blocks() {
            let len = node.block.len();

            validate!(len > 0, ValidationError::EmptyBlock { position: blocks });
            validate!(
                len <= self.block_capacity,
                ValidationError::BlockOverflow {
                    position: blocks,
                    len,
                    capacity: self.block_capacity,
                }
            );
            validate!(
                node.prev == prev,
                ValidationError::BrokenLink { position: blocks }
            );
            if let Some(prev) = prev {
                let prev_fill = self.nodes[prev].block.len();
                validate!(
                    !(self.is_underfilled(len) && self.is_underfilled(prev_fill)),
                    ValidationError::UnderfilledPair { position: blocks }
                );
            }

            count += len;
            blocks += 1;
            prev = Some(id);

            validate!(
                blocks <= self.nodes.len(),
                ValidationError::BlockCountMismatch {
                    expected: self.nodes.len(),
                    actual: blocks,
                }
            );
        }

        validate!(
            self.tail == prev,
            ValidationError::EndpointMismatch {
                message: format!("tail is {:?}, chain ends at {:?}", self.tail, prev),
            }
        );
        validate!(
            blocks == self.nodes.len(),
            ValidationError::BlockCountMismatch {
                expected: self.nodes.len(),
                actual: blocks,
            }
        );
        validate!(
            count == self.len,
            ValidationError::LengthMismatch {
                expected: self.len,
                actual: count,
            }
        );

        Ok(())
    }

    /// Обход звеньев цепочки от головы к хвосту.
    fn blocks(&self) -> impl Iterator<Item = (BlockId, &Node<T>)> + '_ {
        std::iter::successors(self.head.map(|id| (id, &self.nodes[id])), |(_, node)| {
            node.next.map(|id| (id, &self.nodes[id]))
        })
    }

    /// Находит актуальное место для позиции, сохранённой до изменений
    /// списка. Слияния, разделения, вставки и удаления внутри блоков
    /// прослеживаются по истории перемещений.
    pub(crate) fn resolve(
        &self,
        mut position: Position,
    ) -> Resolved {
        loop {
            if let Some(node) = self.nodes.get(position.id) {
                if node.generation == position.generation {
                    return Resolved::At {
                        id: position.id,
                        offset: local_offset(position.offset, node.origin),
                    };
                }
            }
            if position.generation < self.cleared_below {
                return Resolved::Restart;
            }

            let Some(relocation) = self
                .relocations
                .iter()
                .rev()
                .find(|r| r.from == position.generation)
            else {
                return Resolved::Lost;
            };

            let offset = local_offset(position.offset, relocation.origin);
            match relocation.map.apply(offset) {
                Some(next) => position = next,
                None => return Resolved::Restart,
            }
        }
    }

    /// Позиция перед элементом `offset` живого блока `id`.
    pub(crate) fn position_at(
        &self,
        id: BlockId,
        offset: usize,
    ) -> Position {
        let node = &self.nodes[id];
        Position {
            id,
            generation: node.generation,
            offset: offset.wrapping_add(node.origin),
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Выдаёт блоку новое поколение и запоминает, куда переходят позиции
    /// прежнего.
    fn renew(
        &mut self,
        id: BlockId,
        map: impl FnOnce(&Self) -> OffsetMap,
    ) {
        let generation = self.bump_generation();
        let node = &mut self.nodes[id];
        let retired = std::mem::replace(&mut node.generation, generation);
        let origin = node.origin;
        let map = map(self);
        self.record(retired, origin, map);
    }

    fn record(
        &mut self,
        from: u64,
        origin: usize,
        map: OffsetMap,
    ) {
        if self.relocations.len() == RELOCATION_HISTORY {
            self.relocations.pop_front();
        }
        self.relocations.push_back(Relocation { from, origin, map });
    }

    /// Цель, сохраняющая смещения в живом блоке `id` со сдвигом `delta`.
    fn shifted(
        &self,
        id: BlockId,
        delta: isize,
    ) -> Target {
        let node = &self.nodes[id];
        Target::Shift {
            id,
            generation: node.generation,
            base: node.origin.wrapping_add_signed(delta),
        }
    }

    /// Хвост блока укоротился: позиции за новым концом встают на конец.
    fn note_truncated(
        &mut self,
        id: BlockId,
    ) {
        let len = self.nodes[id].block.len();
        self.renew(id, |list| OffsetMap::Split {
            at: len,
            low: list.shifted(id, 0),
            high: Target::Fixed(list.position_at(id, len)),
        });
    }

    /// В блок вставлен элемент на место `at`.
    fn note_inserted(
        &mut self,
        id: BlockId,
        at: usize,
    ) {
        self.renew(id, |list| OffsetMap::Split {
            at,
            low: list.shifted(id, 0),
            high: list.shifted(id, 1),
        });
    }

    /// Из блока удалены элементы с прежними смещениями `offsets`.
    fn note_removed(
        &mut self,
        id: BlockId,
        offsets: Vec<usize>,
    ) {
        self.renew(id, |list| OffsetMap::Removed {
            offsets,
            to: list.shifted(id, 0),
        });
    }

    /// Новый блок с одним запасным слотом: вставка в середину заполненного
    /// блока временно превышает `block_capacity` до разделения.
    fn new_block(&self) -> Block<T> {
        Block::new(self.block_capacity + 1)
    }

    fn link_back(
        &mut self,
        block: Block<T>,
    ) -> BlockId {
        let generation = self.bump_generation();
        let id = self.nodes.insert(Node {
            block,
            prev: self.tail,
            next: None,
            generation,
            origin: 0,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        trace!(block = id, blocks = self.nodes.len(), "block linked at tail");
        id
    }

    fn link_front(
        &mut self,
        block: Block<T>,
    ) -> BlockId {
        let generation = self.bump_generation();
        let id = self.nodes.insert(Node {
            block,
            prev: None,
            next: self.head,
            generation,
            origin: 0,
        });

        match self.head {
            Some(head) => self.nodes[head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);

        trace!(block = id, blocks = self.nodes.len(), "block linked at head");
        id
    }

    fn link_after(
        &mut self,
        anchor: BlockId,
        block: Block<T>,
    ) -> BlockId {
        let next = self.nodes[anchor].next;
        let generation = self.bump_generation();
        let id = self.nodes.insert(Node {
            block,
            prev: Some(anchor),
            next,
            generation,
            origin: 0,
        });

        self.nodes[anchor].next = Some(id);
        match next {
            Some(next) => self.nodes[next].prev = Some(id),
            None => self.tail = Some(id),
        }

        id
    }

    /// Отвязывает блок от цепочки и забирает его из арены. Единственная
    /// точка уничтожения блока.
    fn unlink(
        &mut self,
        id: BlockId,
    ) -> Block<T> {
        let node = self.nodes.remove(id);

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        trace!(block = id, blocks = self.nodes.len(), "block unlinked");
        node.block
    }

    /// Блок ниже порога слияния: заполнен меньше чем наполовину.
    #[inline]
    fn is_underfilled(
        &self,
        fill: usize,
    ) -> bool {
        fill * 2 < self.block_capacity
    }

    /// Приводит блок в порядок после удаления из него: пустой отвязывается,
    /// недозаполненный сливается с соседями.
    fn rebalance(
        &mut self,
        id: BlockId,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.block.is_empty() {
            self.compact(id);
            return;
        }

        let (prev, next) = (node.prev, node.next);
        self.release_empty(id);
        // бывшие соседи пустого блока теперь смежны
        for neighbour in [prev, next].into_iter().flatten() {
            self.compact(neighbour);
        }
    }

    /// Сливает недозаполненный блок с соседями, пока он остаётся
    /// недозаполненным и слияние возможно.
    fn compact(
        &mut self,
        mut id: BlockId,
    ) {
        while self
            .nodes
            .get(id)
            .is_some_and(|node| self.is_underfilled(node.block.len()))
        {
            match self.try_merge(id) {
                Some(survivor) => id = survivor,
                None => break,
            }
        }
    }

    /// Сливает блок с соседом, если суммарный размер не превышает
    /// `block_capacity`. Предпочтение отдаётся предыдущему блоку.
    ///
    /// Возвращает блок, в котором оказались элементы.
    fn try_merge(
        &mut self,
        id: BlockId,
    ) -> Option<BlockId> {
        let node = &self.nodes[id];
        let fill = node.block.len();
        let (prev, next) = (node.prev, node.next);
        let fits = |other: BlockId| fill + self.nodes[other].block.len() <= self.block_capacity;
        let with_prev = prev.filter(|&p| fits(p));
        let with_next = next.filter(|&n| fits(n));

        match (with_prev, with_next) {
            (Some(prev), _) => self.merge_pair(prev, id).then_some(prev),
            (None, Some(next)) => self.merge_pair(id, next).then_some(id),
            (None, None) => None,
        }
    }

    /// Переносит элементы `right` в конец `left` и отвязывает `right`.
    fn merge_pair(
        &mut self,
        left: BlockId,
        right: BlockId,
    ) -> bool {
        let Some((l, r)) = self.nodes.get2_mut(left, right) else {
            return false;
        };
        let base = l.block.len();
        let absorbed = r.block.len();
        if l.block.merge(&mut r.block, true).is_err() {
            return false;
        }
        let fill = l.block.len();
        let target = Target::Shift {
            id: left,
            generation: l.generation,
            base: l.origin.wrapping_add(base),
        };
        let (retired, origin) = (r.generation, r.origin);

        self.record(retired, origin, OffsetMap::uniform(target));
        self.unlink(right);
        trace!(left, right, absorbed, fill, "blocks merged");
        true
    }

    /// Отвязывает опустевший блок. Курсоры с него переходят к началу
    /// следующего блока, а у хвоста к концу предыдущего.
    fn release_empty(
        &mut self,
        id: BlockId,
    ) {
        let node = &self.nodes[id];
        let target = match (node.prev, node.next) {
            (_, Some(next)) => Target::Fixed(self.position_at(next, 0)),
            (Some(prev), None) => {
                Target::Fixed(self.position_at(prev, self.nodes[prev].block.len()))
            }
            (None, None) => Target::Restart,
        };
        let (retired, origin) = (node.generation, node.origin);

        self.record(retired, origin, OffsetMap::uniform(target));
        self.unlink(id);
    }

    /// Делит переполненный блок пополам, правая половина встаёт следом.
    fn split_block(
        &mut self,
        id: BlockId,
    ) {
        let block = &mut self.nodes[id].block;
        let mid = block.len() / 2;
        if mid == 0 {
            return;
        }

        let right = block.split_block(mid - 1, true);
        let (left_len, right_len) = (block.len(), right.len());
        let new_id = self.link_after(id, right);

        self.renew(id, |list| OffsetMap::Split {
            at: left_len,
            low: list.shifted(id, 0),
            high: list.shifted(new_id, -(left_len as isize)),
        });
        trace!(
            left = id,
            right = new_id,
            left_len,
            right_len,
            "block split"
        );
    }

    /// Сливает недозаполненные блоки рядом с `id`.
    fn compact_around(
        &mut self,
        id: BlockId,
    ) {
        let (prev, next) = (self.nodes[id].prev, self.nodes[id].next);

        for candidate in [prev, Some(id), next].into_iter().flatten() {
            self.compact(candidate);
        }
    }

    /// Переводит логический индекс (в том числе отрицательный) в
    /// `(блок, смещение в блоке)`.
    fn locate(
        &self,
        index: isize,
    ) -> QuickListResult<(BlockId, usize)> {
        let pos = self.normalize(index)?;

        if pos < self.len / 2 {
            let mut base = 0;
            let mut cursor = self.head;
            while let Some(id) = cursor {
                let node = &self.nodes[id];
                if pos < base + node.block.len() {
                    return Ok((id, pos - base));
                }
                base += node.block.len();
                cursor = node.next;
            }
        } else {
            let mut end = self.len;
            let mut cursor = self.tail;
            while let Some(id) = cursor {
                let node = &self.nodes[id];
                let start = end.saturating_sub(node.block.len());
                if pos >= start {
                    return Ok((id, pos - start));
                }
                end = start;
                cursor = node.prev;
            }
        }

        Err(self.out_of_range(index))
    }

    fn normalize(
        &self,
        index: isize,
    ) -> QuickListResult<usize> {
        let len = self.len as isize;
        let pos = if index < 0 { len + index } else { index };

        if pos < 0 || pos >= len {
            return Err(self.out_of_range(index));
        }

        Ok(pos as usize)
    }

    /// Проверяет границы `[start, stop)` и возвращает их как `usize`.
    fn check_range(
        &self,
        start: isize,
        stop: isize,
    ) -> QuickListResult<(usize, usize)> {
        if start < 0 {
            return Err(self.out_of_range(start));
        }
        if stop <= start || stop as usize > self.len {
            return Err(self.out_of_range(stop));
        }

        Ok((start as usize, stop as usize))
    }

    #[inline]
    fn out_of_range(
        &self,
        index: isize,
    ) -> QuickListError {
        QuickListError::IndexOutOfRange {
            index,
            len: self.len,
        }
    }
}

impl<T: PartialEq> QuickList<T> {
    /// Вставляет `value` перед первым элементом, равным `pivot`.
    ///
    /// Возвращает `false` и ничего не меняет, если `pivot` не найден.
    pub fn insert_before(
        &mut self,
        pivot: &T,
        value: T,
    ) -> bool {
        self.insert_near(pivot, value, false)
    }

    /// Вставляет `value` после первого элемента, равного `pivot`.
    ///
    /// Возвращает `false` и ничего не меняет, если `pivot` не найден.
    pub fn insert_after(
        &mut self,
        pivot: &T,
        value: T,
    ) -> bool {
        self.insert_near(pivot, value, true)
    }

    /// Удаляет все элементы, равные `value`, и возвращает их кол-во.
    pub fn remove(
        &mut self,
        value: &T,
    ) -> usize {
        self.remove_limited(value, 0)
    }

    /// Удаляет не больше `|count|` элементов, равных `value`.
    ///
    /// - `count > 0`: обход от головы к хвосту;
    /// - `count < 0`: обход от хвоста к голове;
    /// - `count == 0`: без ограничения.
    ///
    /// Порядок оставшихся элементов сохраняется. Опустевшие блоки
    /// отвязываются, недозаполненные сливаются с соседями.
    pub fn remove_limited(
        &mut self,
        value: &T,
        count: isize,
    ) -> usize {
        let limit = match count {
            0 => usize::MAX,
            n => n.unsigned_abs(),
        };

        let (removed, touched) = if count >= 0 {
            self.remove_forward(value, limit)
        } else {
            self.remove_backward(value, limit)
        };

        for id in touched {
            self.rebalance(id);
        }

        removed
    }

    /// Проверяет, есть ли в списке элемент, равный `value`.
    pub fn contains(
        &self,
        value: &T,
    ) -> bool {
        self.blocks()
            .any(|(_, node)| node.block.position(value).is_some())
    }

    fn insert_near(
        &mut self,
        pivot: &T,
        value: T,
        after: bool,
    ) -> bool {
        let Some((id, offset)) = self.find_first(pivot) else {
            return false;
        };

        let at = if after { offset + 1 } else { offset };
        self.nodes[id].block.put_at(value, at);
        self.len += 1;
        self.note_inserted(id, at);

        if self.nodes[id].block.len() > self.block_capacity {
            self.split_block(id);
        }
        self.compact_around(id);

        true
    }

    fn find_first(
        &self,
        value: &T,
    ) -> Option<(BlockId, usize)> {
        self.blocks()
            .find_map(|(id, node)| node.block.position(value).map(|offset| (id, offset)))
    }

    fn remove_forward(
        &mut self,
        value: &T,
        limit: usize,
    ) -> (usize, Vec<BlockId>) {
        let mut removed = 0;
        let mut touched = Vec::new();
        let mut cursor = self.head;

        while let Some(id) = cursor {
            if removed == limit {
                break;
            }

            let block = &mut self.nodes[id].block;
            let mut offsets = Vec::new();
            // левее найденного совпадений уже нет: каждое удаление сдвигает
            // следующее на кол-во уже удалённых из этого блока
            while removed < limit {
                let Some(offset) = block.position(value) else {
                    break;
                };
                if block.remove_at(offset).is_err() {
                    break;
                }
                offsets.push(offset + offsets.len());
                removed += 1;
            }

            cursor = self.nodes[id].next;
            if !offsets.is_empty() {
                self.note_removed(id, offsets);
                touched.push(id);
            }
        }

        self.len -= removed;
        (removed, touched)
    }

    fn remove_backward(
        &mut self,
        value: &T,
        limit: usize,
    ) -> (usize, Vec<BlockId>) {
        let mut removed = 0;
        let mut touched = Vec::new();
        let mut cursor = self.tail;

        while let Some(id) = cursor {
            if removed == limit {
                break;
            }

            let block = &mut self.nodes[id].block;
            let mut offsets = Vec::new();
            // правее найденного совпадений нет, смещения не сдвигаются
            while removed < limit {
                let Some(offset) = block.rposition(value) else {
                    break;
                };
                if block.remove_at(offset).is_err() {
                    break;
                }
                offsets.push(offset);
                removed += 1;
            }

            cursor = self.nodes[id].prev;
            if !offsets.is_empty() {
                offsets.reverse();
                self.note_removed(id, offsets);
                touched.push(id);
            }
        }

        self.len -= removed;
        (removed, touched)
    }
}

impl<T: Clone> QuickList<T> {
    /// Возвращает копии элементов в позициях `[start, stop)`.
    ///
    /// # Ошибки
    /// - [`QuickListError::IndexOutOfRange`], если `start < 0`,
    ///   `stop <= start` или `stop > len`.
    pub fn get_range(
        &self,
        start: isize,
        stop: isize,
    ) -> QuickListResult<Vec<T>> {
        let (from, to) = self.check_range(start, stop)?;
        let wanted = to - from;
        let (id, mut offset) = self.locate(start)?;

        let mut elements = Vec::with_capacity(wanted);
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            for value in node.block.iter().skip(offset).take(wanted - elements.len()) {
                elements.push(value.clone());
            }
            if elements.len() == wanted {
                break;
            }
            offset = 0;
            cursor = node.next;
        }

        Ok(elements)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl<T> Default for QuickList<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_CAPACITY)
    }
}

impl<T: fmt::Debug> fmt::Debug for QuickList<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Равенство логических последовательностей, раскладка по блокам не важна.
impl<T: PartialEq> PartialEq for QuickList<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for QuickList<T> {}

impl<T> Index<isize> for QuickList<T> {
    type Output = T;

    fn index(
        &self,
        index: isize,
    ) -> &Self::Output {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<isize> for QuickList<T> {
    fn index_mut(
        &mut self,
        index: isize,
    ) -> &mut Self::Output {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> FromIterator<T> for QuickList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::default();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for QuickList<T> {
    fn extend<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> IntoIterator for QuickList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a QuickList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
