//! `Block` - сегмент фиксированной ёмкости, из цепочки которых состоит
//! `QuickList`.
//!
//! Блок хранит элементы в кольцевом буфере слотов `Option<T>`. Занятый
//! диапазон `[head, head + len)` (по модулю ёмкости) непрерывен, поэтому
//! вставка и удаление с любого края не перенумеровывают остальные слоты.
//! Сдвиг элементов происходит только при вставке или удалении в середине.
//! О соседних блоках блок ничего не знает.

use std::fmt;

use crate::{
    debug_assert_invariant,
    error::{BlockError, BlockResult},
};

/// Сегмент фиксированной ёмкости с O(1) вставкой и удалением на обоих концах.
///
/// Слоты вне живого диапазона всегда содержат `None` и никогда не читаются
/// через публичные методы.
#[derive(Clone)]
pub struct Block<T> {
    /// Кольцевой буфер слотов, его длина и есть ёмкость блока
    slots: Box<[Option<T>]>,
    /// Физическая позиция первого живого элемента
    head: usize,
    /// Количество живых элементов
    len: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<T> Block<T> {
    /// Создаёт пустой блок заданной ёмкости.
    ///
    /// Ёмкость меньше единицы поднимается до единицы.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>();

        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Создаёт блок заданной ёмкости и заполняет его элементами `elements`.
    ///
    /// # Ошибки
    /// - [`BlockError::CapacityExceeded`], если элементов больше, чем ёмкость.
    pub fn from_vec(
        capacity: usize,
        elements: Vec<T>,
    ) -> BlockResult<Self> {
        let mut block = Self::new(capacity);
        block.init(elements)?;
        Ok(block)
    }

    /// Заменяет содержимое блока элементами из `elements`.
    ///
    /// При ошибке блок остаётся без изменений.
    ///
    /// # Ошибки
    /// - [`BlockError::CapacityExceeded`], если последовательность длиннее
    ///   ёмкости блока.
    pub fn init<I>(
        &mut self,
        elements: I,
    ) -> BlockResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let elements: Vec<T> = elements.into_iter().collect();
        if elements.len() > self.capacity() {
            return Err(BlockError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }

        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;

        for value in elements {
            self.put_back(value);
        }

        Ok(())
    }

    /// Возвращает ёмкость блока.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Возвращает кол-во живых элементов.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Проверяет, пуст ли блок.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Проверяет, заполнен ли блок до ёмкости.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Добавляет элемент в конец блока.
    pub fn push_back(
        &mut self,
        value: T,
    ) -> BlockResult<()> {
        self.ensure_room()?;
        self.put_back(value);
        Ok(())
    }

    /// Добавляет элемент в начало блока.
    pub fn push_front(
        &mut self,
        value: T,
    ) -> BlockResult<()> {
        self.ensure_room()?;
        self.put_front(value);
        Ok(())
    }

    /// Удаляет и возвращает последний элемент.
    pub fn pop_back(&mut self) -> BlockResult<T> {
        if self.len == 0 {
            return Err(BlockError::EmptyBlock);
        }

        let pos = self.physical(self.len - 1);
        self.len -= 1;
        self.slots[pos].take().ok_or(BlockError::EmptyBlock)
    }

    /// Удаляет и возвращает первый элемент.
    pub fn pop_front(&mut self) -> BlockResult<T> {
        if self.len == 0 {
            return Err(BlockError::EmptyBlock);
        }

        let pos = self.head;
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        self.slots[pos].take().ok_or(BlockError::EmptyBlock)
    }

    /// Возвращает ссылку на элемент в позиции `index`.
    pub fn get(
        &self,
        index: usize,
    ) -> BlockResult<&T> {
        self.check_index(index)?;
        let pos = self.physical(index);
        self.slots[pos].as_ref().ok_or(BlockError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Возвращает изменяемую ссылку на элемент в позиции `index`.
    pub fn get_mut(
        &mut self,
        index: usize,
    ) -> BlockResult<&mut T> {
        self.check_index(index)?;
        let len = self.len;
        let pos = self.physical(index);
        self.slots[pos]
            .as_mut()
            .ok_or(BlockError::IndexOutOfRange { index, len })
    }

    /// Перезаписывает элемент в позиции `index`, возвращая прежнее значение.
    pub fn replace_at(
        &mut self,
        value: T,
        index: usize,
    ) -> BlockResult<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Вставляет `value` так, чтобы он оказался в позиции `index`.
    ///
    /// Последующие элементы сдвигаются к хвосту. `index == len` добавляет в
    /// конец, `index == 0` в начало.
    ///
    /// # Ошибки
    /// - [`BlockError::CapacityExceeded`], если блок заполнен;
    /// - [`BlockError::IndexOutOfRange`], если `index > len`.
    pub fn insert_at(
        &mut self,
        value: T,
        index: usize,
    ) -> BlockResult<()> {
        self.ensure_room()?;
        if index > self.len {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }

        self.put_at(value, index);
        Ok(())
    }

    /// Удаляет элемент в позиции `index`, сдвигая последующие к началу.
    ///
    /// Освободившийся хвостовой слот очищается.
    pub fn remove_at(
        &mut self,
        index: usize,
    ) -> BlockResult<T> {
        self.check_index(index)?;

        if index == 0 {
            return self.pop_front();
        }

        let pos = self.physical(index);
        let removed = self.slots[pos].take();

        for i in index + 1..self.len {
            let from = self.physical(i);
            let to = self.physical(i - 1);
            self.slots[to] = self.slots[from].take();
        }
        self.len -= 1;

        removed.ok_or(BlockError::IndexOutOfRange {
            index,
            len: self.len + 1,
        })
    }

    /// Разделяет блок по позиции `offset`.
    ///
    /// - `keep_after == true`: элементы с позициями `> offset` извлекаются и
    ///   возвращаются, в блоке остаётся `[0, offset]`;
    /// - `keep_after == false`: извлекаются элементы с позициями `< offset`,
    ///   в блоке остаётся `[offset, len)`.
    ///
    /// `offset` за пределами `[0, len - 1]` ничего не меняет и возвращает
    /// пустой вектор.
    pub fn split(
        &mut self,
        offset: usize,
        keep_after: bool,
    ) -> Vec<T> {
        if offset >= self.len {
            return Vec::new();
        }

        if keep_after {
            let mut extracted = Vec::with_capacity(self.len - offset - 1);
            for i in offset + 1..self.len {
                let pos = self.physical(i);
                extracted.extend(self.slots[pos].take());
            }
            self.len = offset + 1;
            extracted
        } else {
            let mut extracted = Vec::with_capacity(offset);
            for i in 0..offset {
                let pos = self.physical(i);
                extracted.extend(self.slots[pos].take());
            }
            self.head = self.physical(offset);
            self.len -= offset;
            extracted
        }
    }

    /// То же, что [`Block::split`], но извлечённые элементы сразу
    /// упаковываются в новый блок той же ёмкости.
    pub fn split_block(
        &mut self,
        offset: usize,
        keep_after: bool,
    ) -> Block<T> {
        let mut block = Block::new(self.capacity());
        for value in self.split(offset, keep_after) {
            block.put_back(value);
        }
        block
    }

    /// Переносит все элементы `other` в этот блок: в конец при
    /// `other_is_after == true`, иначе в начало. `other` становится пустым.
    ///
    /// # Ошибки
    /// - [`BlockError::CapacityExceeded`], если суммарная длина превышает
    ///   ёмкость; оба блока при этом не меняются.
    pub fn merge(
        &mut self,
        other: &mut Block<T>,
        other_is_after: bool,
    ) -> BlockResult<()> {
        if self.len + other.len > self.capacity() {
            return Err(BlockError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }

        if other_is_after {
            while let Ok(value) = other.pop_front() {
                self.put_back(value);
            }
        } else {
            while let Ok(value) = other.pop_back() {
                self.put_front(value);
            }
        }

        Ok(())
    }

    /// Возвращает первый элемент, если он есть.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Возвращает последний элемент, если он есть.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i).ok())
    }

    /// Итератор по живым элементам в логическом порядке.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (front, back) = self.as_slices();
        front.iter().chain(back.iter()).flatten()
    }

    /// Позиция первого элемента, равного `value`.
    pub fn position(
        &self,
        value: &T,
    ) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    /// Позиция последнего элемента, равного `value`.
    pub fn rposition(
        &self,
        value: &T,
    ) -> Option<usize>
    where
        T: PartialEq,
    {
        (0..self.len)
            .rev()
            .find(|&i| self.get(i).is_ok_and(|v| v == value))
    }

    /// Переводит логическую позицию в физический индекс слота.
    #[inline]
    fn physical(
        &self,
        index: usize,
    ) -> usize {
        (self.head + index) % self.capacity()
    }

    /// Две части живого диапазона кольцевого буфера.
    fn as_slices(&self) -> (&[Option<T>], &[Option<T>]) {
        let end = self.head + self.len;
        if end <= self.capacity() {
            (&self.slots[self.head..end], &[])
        } else {
            (
                &self.slots[self.head..],
                &self.slots[..end - self.capacity()],
            )
        }
    }

    #[inline]
    fn ensure_room(&self) -> BlockResult<()> {
        if self.is_full() {
            return Err(BlockError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    #[inline]
    fn check_index(
        &self,
        index: usize,
    ) -> BlockResult<()> {
        if index >= self.len {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Запись в конец без проверки ёмкости. Вызывающий гарантирует, что
    /// блок не заполнен.
    pub(crate) fn put_back(
        &mut self,
        value: T,
    ) {
        debug_assert_invariant!(!self.is_full(), "put_back into a full block");
        let pos = self.physical(self.len);
        self.slots[pos] = Some(value);
        self.len += 1;
    }

    /// Запись в начало без проверки ёмкости.
    pub(crate) fn put_front(
        &mut self,
        value: T,
    ) {
        debug_assert_invariant!(!self.is_full(), "put_front into a full block");
        self.head = (self.head + self.capacity() - 1) % self.capacity();
        self.slots[self.head] = Some(value);
        self.len += 1;
    }

    /// Вставка в позицию `index <= len` без проверки ёмкости.
    pub(crate) fn put_at(
        &mut self,
        value: T,
        index: usize,
    ) {
        debug_assert_invariant!(
            !self.is_full() && index <= self.len,
            "put_at({index}) into block of length {}",
            self.len
        );

        if index == 0 {
            self.put_front(value);
            return;
        }

        for i in (index..self.len).rev() {
            let from = self.physical(i);
            let to = self.physical(i + 1);
            self.slots[to] = self.slots[from].take();
        }

        let pos = self.physical(index);
        self.slots[pos] = Some(value);
        self.len += 1;
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl<T: fmt::Debug> fmt::Debug for Block<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
