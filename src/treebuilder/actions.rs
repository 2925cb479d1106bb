//! The named algorithms of tree construction: insertion locations (with
//! foster parenting), the active formatting elements list, implied end
//! tags, the adoption agency, and the insertion-mode reset.

use super::{scopes, FormatElement, FormatEntry, InsertionMode, StackEntry, TreeBuilder};
use crate::dom::{Attribute, Namespace, QualName};
use crate::emitter::StartTag;
use crate::error::{Error, ParseError};
use crate::sink::{NodeOrText, TreeSink};
use crate::treebuilder::foreign;

/// Where a node is about to be inserted.
pub(crate) enum InsertionPoint<H> {
    /// As the last child of the handle.
    LastChild(H),
    /// Immediately before the table, or as the last child of the element
    /// above the table if the table has no parent. Foster parenting.
    TableRelative { table: H, above: H },
}

impl<S: TreeSink> TreeBuilder<S> {
    pub(crate) fn parse_error(&mut self, code: Error) {
        self.sink.parse_error(ParseError {
            code,
            position: self.position,
        });
    }

    pub(crate) fn current(&self) -> Option<&StackEntry<S::Handle>> {
        self.open_elements.last()
    }

    /// Name of the current node, i.e. the top of the stack.
    pub(crate) fn current_name(&self) -> Option<&QualName> {
        self.open_elements.last().map(|e| &e.name)
    }

    pub(crate) fn current_is_html(&self, local: &str) -> bool {
        self.current_name().map_or(false, |n| n.is_html(local))
    }

    /// The adjusted current node: the context element in the fragment case
    /// while only the root `html` is open, the current node otherwise.
    /// Returns the name plus the html-integration-point flag.
    pub(crate) fn adjusted_current(&self) -> Option<(&QualName, bool)> {
        if self.fragment_context.is_some() && self.open_elements.len() == 1 {
            // a bare context name has no attributes, so annotation-xml
            // cannot be an integration point here
            self.fragment_context.as_ref().map(|name| (name, false))
        } else {
            self.open_elements
                .last()
                .map(|e| (&e.name, e.html_integration_point))
        }
    }

    /// Whether the tokenizer should honour `<![CDATA[`: an adjusted
    /// current node exists and is not in the HTML namespace.
    pub fn adjusted_current_node_is_foreign(&self) -> bool {
        match self.adjusted_current() {
            Some((name, _)) => name.ns != Namespace::Html,
            None => false,
        }
    }

    pub(crate) fn set_mode(&mut self, mode: InsertionMode) {
        log::trace!("treebuilder: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub(crate) fn stack_index_of(&self, handle: &S::Handle) -> Option<usize> {
        self.open_elements
            .iter()
            .rposition(|e| self.sink.same_node(&e.handle, handle))
    }

    // ---- scope queries ----------------------------------------------------

    fn scope_matches(
        &self,
        scope: impl Fn(&QualName) -> bool,
        pred: impl Fn(&StackEntry<S::Handle>) -> bool,
    ) -> bool {
        for entry in self.open_elements.iter().rev() {
            if pred(entry) {
                return true;
            }
            if scope(&entry.name) {
                return false;
            }
        }
        false
    }

    pub(crate) fn has_in_scope(&self, scope: impl Fn(&QualName) -> bool, local: &str) -> bool {
        self.scope_matches(scope, |e| e.name.is_html(local))
    }

    pub(crate) fn has_any_in_scope(
        &self,
        scope: impl Fn(&QualName) -> bool,
        locals: &[&str],
    ) -> bool {
        self.scope_matches(scope, |e| {
            e.name.ns == Namespace::Html && locals.contains(&e.name.local.as_str())
        })
    }

    pub(crate) fn has_node_in_scope(
        &self,
        scope: impl Fn(&QualName) -> bool,
        handle: &S::Handle,
    ) -> bool {
        self.scope_matches(scope, |e| self.sink.same_node(&e.handle, handle))
    }

    // ---- stack manipulation ----------------------------------------------

    pub(crate) fn push_stack(&mut self, handle: S::Handle, name: QualName, html_ip: bool) {
        self.open_elements.push(StackEntry {
            handle,
            name,
            html_integration_point: html_ip,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<StackEntry<S::Handle>> {
        self.open_elements.pop()
    }

    /// Pop until an HTML element with one of the given names has been
    /// popped, inclusive.
    pub(crate) fn pop_until_one_of(&mut self, locals: &[&str]) {
        while let Some(entry) = self.open_elements.pop() {
            if entry.name.ns == Namespace::Html && locals.contains(&entry.name.local.as_str()) {
                return;
            }
        }
        debug_assert!(false, "pop_until_one_of ran off the stack");
    }

    pub(crate) fn remove_from_stack(&mut self, handle: &S::Handle) {
        if let Some(idx) = self.stack_index_of(handle) {
            self.open_elements.remove(idx);
        }
    }

    pub(crate) fn stack_has_template(&self) -> bool {
        self.open_elements
            .iter()
            .any(|e| e.name.is_html("template"))
    }

    // ---- insertion --------------------------------------------------------

    /// The appropriate place for inserting a node. `override_target` is a
    /// stack index, used by the adoption agency.
    pub(crate) fn appropriate_place(
        &mut self,
        override_target: Option<usize>,
    ) -> InsertionPoint<S::Handle> {
        let target_idx = override_target.unwrap_or_else(|| {
            debug_assert!(!self.open_elements.is_empty());
            self.open_elements.len() - 1
        });
        let target = &self.open_elements[target_idx];

        if self.foster_parenting
            && target.name.ns == Namespace::Html
            && matches!(
                target.name.local.as_str(),
                "table" | "tbody" | "tfoot" | "thead" | "tr"
            )
        {
            let last_template = self
                .open_elements
                .iter()
                .rposition(|e| e.name.is_html("template"));
            let last_table = self.open_elements.iter().rposition(|e| e.name.is_html("table"));

            match (last_template, last_table) {
                (Some(template), table) if table.map_or(true, |table| template > table) => {
                    let handle = self.open_elements[template].handle.clone();
                    let contents = self.sink.template_contents(&handle);
                    return InsertionPoint::LastChild(contents);
                }
                (_, None) => {
                    // fragment case: the root html element
                    return InsertionPoint::LastChild(self.open_elements[0].handle.clone());
                }
                (_, Some(table)) => {
                    debug_assert!(table > 0);
                    return InsertionPoint::TableRelative {
                        table: self.open_elements[table].handle.clone(),
                        above: self.open_elements[table - 1].handle.clone(),
                    };
                }
            }
        }

        if target.name.is_html("template") {
            let handle = target.handle.clone();
            let contents = self.sink.template_contents(&handle);
            InsertionPoint::LastChild(contents)
        } else {
            InsertionPoint::LastChild(target.handle.clone())
        }
    }

    pub(crate) fn insert_at(
        &mut self,
        point: InsertionPoint<S::Handle>,
        child: NodeOrText<S::Handle>,
    ) {
        match point {
            InsertionPoint::LastChild(parent) => self.sink.append(&parent, child),
            InsertionPoint::TableRelative { table, above } => {
                self.sink.append_based_on_parent_node(&table, &above, child)
            }
        }
    }

    pub(crate) fn insert_characters(&mut self, text: &str) {
        let point = self.appropriate_place(None);
        self.insert_at(point, NodeOrText::AppendText(text.to_owned()));
    }

    pub(crate) fn insert_comment(&mut self, text: &str) {
        let comment = self.sink.create_comment(text.to_owned());
        let point = self.appropriate_place(None);
        self.insert_at(point, NodeOrText::AppendNode(comment));
    }

    pub(crate) fn append_comment_to(&mut self, parent: S::Handle, text: &str) {
        let comment = self.sink.create_comment(text.to_owned());
        self.sink.append(&parent, NodeOrText::AppendNode(comment));
    }

    /// Create an element for a token in the given namespace. SVG tag-name
    /// and all attribute adjustments happen here.
    pub(crate) fn create_element_for(
        &mut self,
        tag: &StartTag,
        ns: Namespace,
    ) -> (S::Handle, QualName, bool) {
        let local = match ns {
            Namespace::Svg => foreign::adjust_svg_tag_name(&tag.name).to_owned(),
            _ => tag.name.clone(),
        };
        let name = QualName::new(ns, local);
        let attrs = foreign::adjust_attributes(ns, tag);
        let html_ip = scopes::svg_html_integration_point(&name)
            || (ns == Namespace::MathMl
                && name.local == "annotation-xml"
                && tag.attribute("encoding").map_or(false, |encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                }));
        let handle = self.sink.create_element(name.clone(), attrs);
        (handle, name, html_ip)
    }

    pub(crate) fn insert_foreign_element(&mut self, tag: &StartTag, ns: Namespace) -> S::Handle {
        let (handle, name, html_ip) = self.create_element_for(tag, ns);
        let point = self.appropriate_place(None);
        self.insert_at(point, NodeOrText::AppendNode(handle.clone()));
        self.push_stack(handle.clone(), name, html_ip);
        handle
    }

    pub(crate) fn insert_html_element(&mut self, tag: &StartTag) -> S::Handle {
        self.insert_foreign_element(tag, Namespace::Html)
    }

    /// Insert an element for a synthesized start tag with no attributes
    /// (implied `<head>`, `<body>`, `<tbody>`, …).
    pub(crate) fn insert_phantom(&mut self, local: &str) -> S::Handle {
        let tag = StartTag {
            name: local.to_owned(),
            ..StartTag::default()
        };
        self.insert_html_element(&tag)
    }

    /// The generic raw text / RCDATA element parsing algorithm.
    pub(crate) fn parse_raw_data(&mut self, tag: &StartTag, state: crate::State) {
        self.insert_html_element(tag);
        self.request_tokenizer_state(state);
        self.original_mode = Some(self.mode);
        self.set_mode(InsertionMode::Text);
    }

    pub(crate) fn request_tokenizer_state(&mut self, state: crate::State) {
        self.tokenizer_state_request = Some(state);
    }

    // ---- implied end tags -------------------------------------------------

    pub(crate) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(name) = self.current_name() {
            if name.ns != Namespace::Html {
                break;
            }
            let local = name.local.as_str();
            if except == Some(local) {
                break;
            }
            if !matches!(
                local,
                "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb" | "rp" | "rt" | "rtc"
            ) {
                break;
            }
            self.pop();
        }
    }

    pub(crate) fn generate_implied_end_tags_thoroughly(&mut self) {
        while let Some(name) = self.current_name() {
            if name.ns != Namespace::Html {
                break;
            }
            if !matches!(
                name.local.as_str(),
                "caption" | "colgroup" | "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb"
                    | "rp" | "rt" | "rtc" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
            ) {
                break;
            }
            self.pop();
        }
    }

    pub(crate) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_is_html("p") {
            self.parse_error(Error::UnexpectedEndTag);
        }
        self.pop_until_one_of(&["p"]);
    }

    // ---- active formatting elements ---------------------------------------

    pub(crate) fn push_marker(&mut self) {
        self.active_formatting.push(FormatEntry::Marker);
    }

    /// Push a formatting element, applying the Noah's Ark clause: at most
    /// three entries with the same name, namespace and attribute set since
    /// the last marker; the earliest goes overboard.
    pub(crate) fn push_formatting(&mut self, handle: S::Handle, name: QualName, tag: StartTag) {
        let mut matching = Vec::new();
        for (idx, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => break,
                FormatEntry::Element(elem) => {
                    if elem.name == name && attrs_equal(&elem.tag, &tag) {
                        matching.push(idx);
                    }
                }
            }
        }
        if matching.len() >= 3 {
            // earliest match has the smallest index
            self.active_formatting.remove(*matching.last().unwrap());
        }
        self.active_formatting
            .push(FormatEntry::Element(FormatElement { handle, name, tag }));
    }

    pub(crate) fn clear_formatting_to_marker(&mut self) {
        while let Some(entry) = self.active_formatting.pop() {
            if matches!(entry, FormatEntry::Marker) {
                break;
            }
        }
    }

    /// Index in the formatting list of the last element with the given
    /// HTML-namespace name, at or after the last marker.
    pub(crate) fn formatting_index(&self, local: &str) -> Option<usize> {
        for (idx, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => return None,
                FormatEntry::Element(elem) => {
                    if elem.name.is_html(local) {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    pub(crate) fn formatting_index_of_node(&self, handle: &S::Handle) -> Option<usize> {
        self.active_formatting.iter().rposition(|entry| match entry {
            FormatEntry::Element(elem) => self.sink.same_node(&elem.handle, handle),
            FormatEntry::Marker => false,
        })
    }

    pub(crate) fn remove_from_formatting(&mut self, handle: &S::Handle) {
        if let Some(idx) = self.formatting_index_of_node(handle) {
            self.active_formatting.remove(idx);
        }
    }

    /// Reconstruct the active formatting elements: re-open every formatting
    /// element after the last marker that is no longer on the stack.
    pub(crate) fn reconstruct_formatting(&mut self) {
        let mut entry_idx = match self.active_formatting.len().checked_sub(1) {
            Some(idx) => idx,
            None => return,
        };

        match &self.active_formatting[entry_idx] {
            FormatEntry::Marker => return,
            FormatEntry::Element(elem) => {
                if self.stack_index_of(&elem.handle.clone()).is_some() {
                    return;
                }
            }
        }

        // rewind to the first entry that needs reconstruction
        loop {
            if entry_idx == 0 {
                break;
            }
            entry_idx -= 1;
            let on_stack = match &self.active_formatting[entry_idx] {
                FormatEntry::Marker => true,
                FormatEntry::Element(elem) => self.stack_index_of(&elem.handle.clone()).is_some(),
            };
            if on_stack {
                entry_idx += 1;
                break;
            }
        }

        // advance, cloning elements back onto the stack
        while entry_idx < self.active_formatting.len() {
            let tag = match &self.active_formatting[entry_idx] {
                FormatEntry::Element(elem) => elem.tag.clone(),
                FormatEntry::Marker => unreachable!("marker inside reconstruction range"),
            };
            let new_handle = self.insert_html_element(&tag);
            let name = QualName::html(tag.name.clone());
            self.active_formatting[entry_idx] = FormatEntry::Element(FormatElement {
                handle: new_handle,
                name,
                tag,
            });
            entry_idx += 1;
        }
    }

    // ---- the adoption agency algorithm ------------------------------------

    /// The adoption agency algorithm for an end tag named `subject`, as the
    /// standard's numbered steps, outer loop bounded at 8 and inner at 3.
    pub(crate) fn adoption_agency(&mut self, subject: &str) {
        // step 2: trivial case
        if self.current_name().map_or(false, |n| n.is_html(subject))
            && self
                .current()
                .map_or(false, |e| self.formatting_index_of_node(&e.handle).is_none())
        {
            self.pop();
            return;
        }

        for _ in 0..8 {
            // step 4: locate the formatting element
            let fmt_idx = match self.formatting_index(subject) {
                Some(idx) => idx,
                None => {
                    self.in_body_any_other_end_tag(subject);
                    return;
                }
            };
            let (fmt_handle, fmt_tag) = match &self.active_formatting[fmt_idx] {
                FormatEntry::Element(elem) => (elem.handle.clone(), elem.tag.clone()),
                FormatEntry::Marker => unreachable!(),
            };

            let stack_idx = match self.stack_index_of(&fmt_handle) {
                Some(idx) => idx,
                None => {
                    self.parse_error(Error::AdoptionAgencyMismatchedTags);
                    self.active_formatting.remove(fmt_idx);
                    return;
                }
            };

            if !self.has_node_in_scope(scopes::default_scope, &fmt_handle) {
                self.parse_error(Error::AdoptionAgencyMismatchedTags);
                return;
            }

            if stack_idx != self.open_elements.len() - 1 {
                self.parse_error(Error::EndTagTooEarly);
            }

            // step 8: the furthest block, the topmost special element below
            // the formatting element
            let furthest_block = self.open_elements[stack_idx + 1..]
                .iter()
                .position(|e| scopes::is_special(&e.name))
                .map(|offset| stack_idx + 1 + offset);

            let furthest_idx = match furthest_block {
                Some(idx) => idx,
                None => {
                    // step 9: no furthest block, pop through the formatting
                    // element and drop it from the list
                    self.open_elements.truncate(stack_idx);
                    self.active_formatting.remove(fmt_idx);
                    return;
                }
            };

            let common_ancestor = self.open_elements[stack_idx - 1].handle.clone();
            let mut bookmark = fmt_idx;

            // step 13: walk upwards from the furthest block
            let furthest_handle = self.open_elements[furthest_idx].handle.clone();
            let mut last_node = furthest_handle.clone();
            let mut node_idx = furthest_idx;
            let mut inner = 0;
            loop {
                node_idx -= 1;
                if self
                    .sink
                    .same_node(&self.open_elements[node_idx].handle, &fmt_handle)
                {
                    break;
                }
                inner += 1;

                let node_handle = self.open_elements[node_idx].handle.clone();
                let node_fmt_idx = self.formatting_index_of_node(&node_handle);

                if inner > 3 {
                    if let Some(idx) = node_fmt_idx {
                        self.active_formatting.remove(idx);
                        if idx < bookmark {
                            bookmark -= 1;
                        }
                        self.open_elements.remove(node_idx);
                        continue;
                    }
                }

                let node_fmt_idx = match node_fmt_idx {
                    Some(idx) => idx,
                    None => {
                        self.open_elements.remove(node_idx);
                        continue;
                    }
                };

                // step 13.7: replace node with a fresh element created for
                // its original token
                let node_tag = match &self.active_formatting[node_fmt_idx] {
                    FormatEntry::Element(elem) => elem.tag.clone(),
                    FormatEntry::Marker => unreachable!(),
                };
                let (new_handle, new_name, _) =
                    self.create_element_for(&node_tag, Namespace::Html);
                self.active_formatting[node_fmt_idx] = FormatEntry::Element(FormatElement {
                    handle: new_handle.clone(),
                    name: new_name.clone(),
                    tag: node_tag,
                });
                self.open_elements[node_idx] = StackEntry {
                    handle: new_handle.clone(),
                    name: new_name,
                    html_integration_point: false,
                };

                if self.sink.same_node(&last_node, &furthest_handle) {
                    bookmark = node_fmt_idx + 1;
                }

                self.sink.remove_from_parent(&last_node);
                self.sink
                    .append(&new_handle, NodeOrText::AppendNode(last_node));
                last_node = new_handle;
            }

            // step 14: move last node below the common ancestor, foster
            // parenting included
            self.sink.remove_from_parent(&last_node);
            let ancestor_idx = self
                .stack_index_of(&common_ancestor)
                .expect("common ancestor left the stack");
            let point = self.appropriate_place_fostering(ancestor_idx);
            self.insert_at(point, NodeOrText::AppendNode(last_node));

            // steps 15-17: fresh element for the formatting token takes over
            // the furthest block's children
            let (new_fmt_handle, new_fmt_name, _) =
                self.create_element_for(&fmt_tag, Namespace::Html);
            self.sink
                .reparent_children(&furthest_handle, &new_fmt_handle);
            self.sink
                .append(&furthest_handle, NodeOrText::AppendNode(new_fmt_handle.clone()));

            // step 18: move the formatting entry to the bookmark
            let fmt_idx = self
                .formatting_index_of_node(&fmt_handle)
                .expect("formatting entry vanished");
            self.active_formatting.remove(fmt_idx);
            let bookmark = if fmt_idx < bookmark {
                bookmark - 1
            } else {
                bookmark
            };
            self.active_formatting.insert(
                bookmark,
                FormatEntry::Element(FormatElement {
                    handle: new_fmt_handle.clone(),
                    name: new_fmt_name.clone(),
                    tag: fmt_tag,
                }),
            );

            // step 19: same dance on the stack: formatting element out, new
            // element in right above the furthest block
            let stack_idx = self
                .stack_index_of(&fmt_handle)
                .expect("formatting element vanished from the stack");
            self.open_elements.remove(stack_idx);
            let furthest_idx = self
                .stack_index_of(&furthest_handle)
                .expect("furthest block vanished from the stack");
            self.open_elements.insert(
                furthest_idx + 1,
                StackEntry {
                    handle: new_fmt_handle,
                    name: new_fmt_name,
                    html_integration_point: false,
                },
            );
        }
    }

    /// The appropriate place with an override target, with foster
    /// parenting forced on for the duration (adoption agency step 14).
    fn appropriate_place_fostering(&mut self, target_idx: usize) -> InsertionPoint<S::Handle> {
        let saved = self.foster_parenting;
        self.foster_parenting = true;
        let point = self.appropriate_place(Some(target_idx));
        self.foster_parenting = saved;
        point
    }

    /// "Any other end tag" in the in-body mode; also the adoption agency's
    /// bail-out.
    pub(crate) fn in_body_any_other_end_tag(&mut self, local: &str) {
        let mut idx = self.open_elements.len();
        while idx > 0 {
            idx -= 1;
            let entry = &self.open_elements[idx];
            if entry.name.is_html(local) {
                self.generate_implied_end_tags(Some(local));
                if idx != self.open_elements.len() - 1 {
                    self.parse_error(Error::UnexpectedEndTag);
                }
                self.open_elements.truncate(idx);
                return;
            }
            if scopes::is_special(&entry.name) {
                self.parse_error(Error::UnexpectedEndTag);
                return;
            }
        }
    }

    // ---- mode reset -------------------------------------------------------

    /// Reset the insertion mode appropriately, for table/select recovery,
    /// template popping and fragment setup.
    pub(crate) fn reset_insertion_mode(&mut self) {
        let mode = self.compute_reset_mode();
        self.set_mode(mode);
    }

    fn compute_reset_mode(&self) -> InsertionMode {
        for (idx, entry) in self.open_elements.iter().enumerate().rev() {
            let last = idx == 0;
            let name = if last && self.fragment_context.is_some() {
                self.fragment_context.as_ref().unwrap()
            } else {
                &entry.name
            };
            if name.ns != Namespace::Html {
                if last {
                    return InsertionMode::InBody;
                }
                continue;
            }
            match name.local.as_str() {
                "select" => {
                    if !last {
                        for ancestor in self.open_elements[..idx].iter().rev() {
                            if ancestor.name.is_html("template") {
                                break;
                            }
                            if ancestor.name.is_html("table") {
                                return InsertionMode::InSelectInTable;
                            }
                        }
                    }
                    return InsertionMode::InSelect;
                }
                "td" | "th" if !last => return InsertionMode::InCell,
                "tr" => return InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                "caption" => return InsertionMode::InCaption,
                "colgroup" => return InsertionMode::InColumnGroup,
                "table" => return InsertionMode::InTable,
                "template" => {
                    return *self
                        .template_modes
                        .last()
                        .expect("template on stack without a template mode")
                }
                "head" if !last => return InsertionMode::InHead,
                "body" => return InsertionMode::InBody,
                "frameset" => return InsertionMode::InFrameset,
                "html" => {
                    return if self.head_element.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ if last => return InsertionMode::InBody,
                _ => {}
            }
        }
        InsertionMode::InBody
    }

    // ---- table helpers ----------------------------------------------------

    pub(crate) fn clear_stack_to_table_context(&mut self) {
        while let Some(name) = self.current_name() {
            if name.ns == Namespace::Html
                && matches!(name.local.as_str(), "table" | "template" | "html")
            {
                break;
            }
            self.pop();
        }
    }

    pub(crate) fn clear_stack_to_table_body_context(&mut self) {
        while let Some(name) = self.current_name() {
            if name.ns == Namespace::Html
                && matches!(
                    name.local.as_str(),
                    "tbody" | "tfoot" | "thead" | "template" | "html"
                )
            {
                break;
            }
            self.pop();
        }
    }

    pub(crate) fn clear_stack_to_table_row_context(&mut self) {
        while let Some(name) = self.current_name() {
            if name.ns == Namespace::Html
                && matches!(name.local.as_str(), "tr" | "template" | "html")
            {
                break;
            }
            self.pop();
        }
    }

    /// Close the cell the parser is in (both the `td` and `th` variants).
    pub(crate) fn close_the_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !self.current_is_html("td") && !self.current_is_html("th") {
            self.parse_error(Error::UnexpectedCellEndTag);
        }
        self.pop_until_one_of(&["td", "th"]);
        self.clear_formatting_to_marker();
        self.set_mode(InsertionMode::InRow);
    }

    // ---- attribute conversion ---------------------------------------------

    pub(crate) fn html_attributes(tag: &StartTag) -> Vec<Attribute> {
        foreign::adjust_attributes(Namespace::Html, tag)
    }
}

fn attrs_equal(a: &StartTag, b: &StartTag) -> bool {
    a.attributes.len() == b.attributes.len()
        && a.attributes.iter().all(|(name, value)| {
            b.attributes
                .iter()
                .any(|(other_name, other_value)| name == other_name && value == other_value)
        })
}
